#[cfg(test)]
#[path = "role_test.rs"]
mod tests;

/// Who wrote a turn in the conversation history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    /// The `type` tag used in persisted history files.
    pub fn as_type(&self) -> &'static str {
        match self {
            Role::Human => return "human",
            Role::Assistant => return "ai",
        }
    }

    /// Resolves a persisted `type` tag. Unknown tags resolve to `None` so
    /// callers can skip them.
    pub fn from_type(kind: &str) -> Option<Role> {
        match kind {
            "human" => return Some(Role::Human),
            "ai" => return Some(Role::Assistant),
            _ => return None,
        }
    }
}

impl ToString for Role {
    fn to_string(&self) -> String {
        match self {
            Role::Human => return String::from("You"),
            Role::Assistant => return String::from("Assistant"),
        }
    }
}
