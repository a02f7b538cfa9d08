#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::Message;
use super::Role;

pub const SYSTEM_INSTRUCTION: &str = "You are a legal assistant.";

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Gemini,
    OpenAI,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    Human,
    Assistant,
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> ChatRole {
        match role {
            Role::Human => return ChatRole::Human,
            Role::Assistant => return ChatRole::Assistant,
        }
    }
}

/// One entry of the ordered context sent to a chat model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> ChatMessage {
        return ChatMessage {
            role: ChatRole::System,
            content: content.to_string(),
        };
    }

    pub fn human(content: &str) -> ChatMessage {
        return ChatMessage {
            role: ChatRole::Human,
            content: content.to_string(),
        };
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> ChatMessage {
        return ChatMessage {
            role: message.role().into(),
            content: message.content().to_string(),
        };
    }
}

/// Builds the request context for a fresh case: the system instruction and
/// the case text, nothing else.
pub fn case_context(case_text: &str) -> Vec<ChatMessage> {
    return vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::human(case_text),
    ];
}

/// Builds the request context for a follow up question: the system
/// instruction followed by every turn of the history in order.
pub fn history_context(history: &[Message]) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SYSTEM_INSTRUCTION)];
    messages.extend(history.iter().map(ChatMessage::from));

    return messages;
}

/// A model reply normalized by the backend adapter. Whatever shape the
/// provider answers with, only the generated text survives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
    pub content: String,
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used before a session starts to verify credentials and connectivity.
    async fn health_check(&self) -> Result<()>;

    /// Sends the ordered context to the model and waits for the full reply.
    /// Payloads that can't be normalized fail with
    /// `AssistantError::UnexpectedResponseType`.
    async fn get_completion(&self, messages: Vec<ChatMessage>) -> Result<BackendResponse>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
