#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;

use super::History;
use crate::domain::models::case_context;
use crate::domain::models::history_context;
use crate::domain::models::AssistantError;
use crate::domain::models::BackendBox;
use crate::domain::models::ChatMessage;
use crate::domain::models::Message;

/// Talks to the chat model on behalf of one session and keeps its history.
pub struct LegalAssistant {
    backend: BackendBox,
    history: History,
}

impl LegalAssistant {
    pub fn new(backend: BackendBox) -> LegalAssistant {
        return LegalAssistant {
            backend,
            history: History::default(),
        };
    }

    pub fn history(&self) -> &History {
        return &self.history;
    }

    pub fn history_mut(&mut self) -> &mut History {
        return &mut self.history;
    }

    /// Summarizes a new case. Only the system instruction and `case_text` are
    /// sent, earlier turns are not replayed.
    pub async fn process_legal_case(&mut self, case_text: &str) -> Result<String, AssistantError> {
        if case_text.trim().is_empty() {
            return Err(AssistantError::Validation(
                "Case text must not be empty.".to_string(),
            ));
        }

        self.history.append(Message::human(case_text));
        let reply = self.complete(case_context(case_text)).await?;
        self.history.append(Message::assistant(&reply));

        return Ok(reply);
    }

    /// Answers a follow up question with the whole history, including the
    /// question itself, as context.
    pub async fn answer_question(&mut self, user_query: &str) -> Result<String, AssistantError> {
        if user_query.trim().is_empty() {
            return Err(AssistantError::Validation(
                "Question must not be empty.".to_string(),
            ));
        }

        self.history.append(Message::human(user_query));
        let reply = self.complete(history_context(self.history.all())).await?;
        self.history.append(Message::assistant(&reply));

        return Ok(reply);
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AssistantError> {
        tracing::debug!(
            backend = %self.backend.name(),
            messages = messages.len(),
            "Requesting completion"
        );

        let res = self
            .backend
            .get_completion(messages)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Completion request failed");
                return AssistantError::from_model_backend(err);
            })?;

        return Ok(res.content);
    }
}
