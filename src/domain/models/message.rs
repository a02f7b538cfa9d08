#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

/// A single turn in the conversation. Turns never change once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
        };
    }

    pub fn human(content: &str) -> Message {
        return Message::new(Role::Human, content);
    }

    pub fn assistant(content: &str) -> Message {
        return Message::new(Role::Assistant, content);
    }

    pub fn role(&self) -> Role {
        return self.role;
    }

    pub fn content(&self) -> &str {
        return &self.content;
    }

    pub fn to_record(&self) -> HistoryRecord {
        return HistoryRecord {
            kind: self.role.as_type().to_string(),
            content: Some(self.content.to_string()),
        };
    }
}

/// Persisted form of a [`Message`]: `{ "type": "human" | "ai", "content": "..." }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl HistoryRecord {
    pub fn new(kind: &str, content: &str) -> HistoryRecord {
        return HistoryRecord {
            kind: kind.to_string(),
            content: Some(content.to_string()),
        };
    }

    /// Reads a record from a loosely shaped JSON entry. A `type` that is not a
    /// string never resolves to a known role, and `content` is only kept when
    /// it is a string.
    pub fn from_value(value: &serde_json::Value) -> HistoryRecord {
        let kind = match value.get("type") {
            Some(serde_json::Value::String(kind)) => kind.to_string(),
            Some(other) => other.to_string(),
            None => "".to_string(),
        };

        return HistoryRecord {
            kind,
            content: value
                .get("content")
                .and_then(|e| return e.as_str())
                .map(|e| return e.to_string()),
        };
    }
}
