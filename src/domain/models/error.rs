use thiserror::Error;

/// Failures a user can see while working through a case. Each one is
/// reported and replaced with a safe default by the session rather than
/// ending it.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    Validation(String),

    #[error("Selected language '{0}' is not supported.")]
    UnsupportedLanguage(String),

    #[error("Translation error: {0}")]
    TranslationBackend(String),

    #[error("The model backend failed with the following error: {0}")]
    ModelBackend(String),

    #[error("Unexpected response type: {0}")]
    UnexpectedResponseType(String),

    #[error("Failed to load chat history: {0}")]
    HistoryLoad(String),
}

impl AssistantError {
    /// Wraps an infrastructure failure from a chat backend. Adapters raise
    /// `UnexpectedResponseType` themselves when a payload can't be
    /// normalized, so that variant is kept as-is.
    pub fn from_model_backend(err: anyhow::Error) -> AssistantError {
        return match err.downcast::<AssistantError>() {
            Ok(assistant_err) => assistant_err,
            Err(err) => AssistantError::ModelBackend(format!("{err:#}")),
        };
    }

    pub fn from_translation_backend(err: anyhow::Error) -> AssistantError {
        return match err.downcast::<AssistantError>() {
            Ok(assistant_err) => assistant_err,
            Err(err) => AssistantError::TranslationBackend(format!("{err:#}")),
        };
    }
}
