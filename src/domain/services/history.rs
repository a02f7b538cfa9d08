#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use anyhow::Result;
use serde::Serialize;

use crate::domain::models::AssistantError;
use crate::domain::models::HistoryRecord;
use crate::domain::models::Message;
use crate::domain::models::Role;

/// Ordered log of conversation turns. Past turns can't be edited or
/// reordered, the log only grows, gets cleared, or gets replaced whole.
#[derive(Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn all(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replaces every turn with the ones rebuilt from `records`. Records with
    /// an unknown `type` are skipped. On error the current turns are kept.
    pub fn load(&mut self, records: Vec<HistoryRecord>) -> Result<(), AssistantError> {
        let mut messages: Vec<Message> = vec![];
        for (idx, record) in records.into_iter().enumerate() {
            let role = match Role::from_type(&record.kind) {
                Some(role) => role,
                None => {
                    tracing::debug!(index = idx, kind = %record.kind, "Skipping history entry");
                    continue;
                }
            };

            let content = record.content.ok_or_else(|| {
                return AssistantError::HistoryLoad(format!(
                    "entry {idx} of type '{}' has no content",
                    record.kind
                ));
            })?;
            messages.push(Message::new(role, &content));
        }

        self.messages = messages;
        return Ok(());
    }

    pub fn save(&self) -> Vec<HistoryRecord> {
        return self
            .messages
            .iter()
            .map(|message| return message.to_record())
            .collect();
    }

    /// Pretty prints [`History::save`] as JSON with four space indentation.
    pub fn to_json(&self) -> Result<String> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut payload = vec![];
        let mut serializer = serde_json::Serializer::with_formatter(&mut payload, formatter);
        self.save().serialize(&mut serializer)?;

        return Ok(String::from_utf8(payload)?);
    }

    /// Parses a history payload into records for [`History::load`].
    pub fn parse_json(payload: &str) -> Result<Vec<HistoryRecord>, AssistantError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(payload)
            .map_err(|err| return AssistantError::HistoryLoad(err.to_string()))?;

        return Ok(entries.iter().map(HistoryRecord::from_value).collect());
    }
}
