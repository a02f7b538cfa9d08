use anyhow::Result;
use async_trait::async_trait;

/// Language code the translation backend understands when it should detect
/// the source language on its own.
pub const AUTO_LANGUAGE_CODE: &str = "auto";

#[async_trait]
pub trait Translator {
    /// Translates `text` from `source` to `target`. Both are ISO 639-1 codes,
    /// `source` may be `auto`.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Returns the ISO 639-1 code of the most likely language of `text`.
    async fn detect(&self, text: &str) -> Result<String>;
}

pub type TranslatorBox = Box<dyn Translator + Send + Sync>;
