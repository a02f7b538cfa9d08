#[cfg(test)]
#[path = "case_session_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::sync::mpsc;

use super::Citations;
use super::ChunkedTranslator;
use super::HistoryFiles;
use super::LegalAssistant;
use crate::domain::models::AssistantError;
use crate::domain::models::Event;
use crate::domain::models::Language;
use crate::domain::models::LanguageSelection;
use crate::domain::models::SummarizationLevel;

/// Everything produced by analyzing one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseReport {
    pub language: Language,
    pub translated_text: Option<String>,
    pub summary: String,
    pub translated_summary: Option<String>,
    pub citations: Vec<String>,
}

/// Per-user working context. Owns the assistant, its history and the
/// translator, and turns every failure into a notice plus a safe default so
/// the session keeps going.
pub struct CaseSession {
    assistant: LegalAssistant,
    translator: ChunkedTranslator,
    tx: mpsc::UnboundedSender<Event>,
}

impl CaseSession {
    pub fn new(
        assistant: LegalAssistant,
        translator: ChunkedTranslator,
        tx: mpsc::UnboundedSender<Event>,
    ) -> CaseSession {
        return CaseSession {
            assistant,
            translator,
            tx,
        };
    }

    pub fn assistant(&self) -> &LegalAssistant {
        return &self.assistant;
    }

    fn report(&self, err: AssistantError) {
        tracing::warn!(error = %err, "Reporting error to user");
        Event::Error(err).notify(&self.tx);
    }

    async fn resolve_language(
        &self,
        text: &str,
        selection: LanguageSelection,
    ) -> Result<Language, AssistantError> {
        if let Some(language) = selection.language() {
            return Ok(language);
        }

        let code = self.translator.detect(text).await?;
        tracing::debug!(code = %code, "Detected document language");

        return Language::from_code(&code);
    }

    /// Summarizes a document. Non-English documents are translated to English
    /// first and the summary translated back. Returns `None` when the
    /// document can't be processed at all, the reason having been reported.
    pub async fn analyze(
        &mut self,
        case_text: &str,
        selection: LanguageSelection,
        level: SummarizationLevel,
    ) -> Result<Option<CaseReport>> {
        if case_text.trim().is_empty() {
            self.report(AssistantError::Validation(
                "Please provide a legal document or paste the case text.".to_string(),
            ));
            return Ok(None);
        }

        let language = match self.resolve_language(case_text, selection).await {
            Ok(language) => language,
            Err(err) => {
                self.report(err);
                return Ok(None);
            }
        };

        let mut report = CaseReport {
            language,
            translated_text: None,
            summary: "".to_string(),
            translated_summary: None,
            citations: Citations::find(case_text),
        };

        if language == Language::English {
            let prompt = format!("{case_text}{}", level.instruction());
            report.summary = self.summarize(&prompt).await?;
            return Ok(Some(report));
        }

        let english_code = Language::English.code();
        let translated_text = self
            .translator
            .translate(case_text, language.code(), english_code, &self.tx)
            .await?;
        report.summary = self.summarize(&translated_text).await?;
        report.translated_text = Some(translated_text);

        if !report.summary.is_empty() {
            let translated_summary = self
                .translator
                .translate(&report.summary, english_code, language.code(), &self.tx)
                .await?;
            report.translated_summary = Some(translated_summary);
        }

        return Ok(Some(report));
    }

    async fn summarize(&mut self, case_text: &str) -> Result<String> {
        match self.assistant.process_legal_case(case_text).await {
            Ok(summary) => return Ok(summary),
            Err(err) => {
                self.report(err);
                return Ok("".to_string());
            }
        }
    }

    /// Answers a question about the conversation so far. Failures are
    /// reported and answered with an empty string.
    pub async fn ask(&mut self, user_query: &str) -> Result<String> {
        match self.assistant.answer_question(user_query).await {
            Ok(answer) => return Ok(answer),
            Err(err) => {
                self.report(err);
                return Ok("".to_string());
            }
        }
    }

    pub async fn save_history(&self, file_path: &path::Path) -> Result<()> {
        match HistoryFiles::export(file_path, self.assistant.history()).await {
            Ok(()) => {
                Event::Success(format!("Chat history saved to {}", file_path.display()))
                    .notify(&self.tx);
            }
            Err(err) => {
                Event::Warning(format!("Failed to save chat history: {err:#}"))
                    .notify(&self.tx);
            }
        }

        return Ok(());
    }

    /// Replaces the history with the one stored at `file_path`. On failure
    /// the current history stays as it was.
    pub async fn load_history(&mut self, file_path: &path::Path) -> Result<()> {
        let res = match HistoryFiles::import(file_path).await {
            Ok(records) => self.assistant.history_mut().load(records),
            Err(err) => Err(err),
        };

        match res {
            Ok(()) => {
                Event::Success("Chat history loaded successfully!".to_string())
                    .notify(&self.tx);
            }
            Err(err) => self.report(err),
        }

        return Ok(());
    }

    pub fn clear_history(&mut self) {
        self.assistant.history_mut().clear();
    }

    /// Tears the session down. The history does not outlive it.
    pub fn end(mut self) {
        tracing::debug!(
            turns = self.assistant.history().len(),
            "Ending session"
        );
        self.clear_history();
    }
}
