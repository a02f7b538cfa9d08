#[cfg(test)]
#[path = "chunked_translator_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::AssistantError;
use crate::domain::models::Event;
use crate::domain::models::TranslatorBox;

pub const DEFAULT_MAX_LENGTH: usize = 5000;

/// Splits `text` into contiguous chunks of `max_length` characters. Only the
/// last chunk may be shorter. Boundaries are positional and may fall inside
/// a word, never inside a UTF-8 sequence.
pub fn split_chunks(text: &str, max_length: usize) -> Vec<&str> {
    let mut chunks: Vec<&str> = vec![];
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_length {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    return chunks;
}

/// Translates text of any length by keeping every request to the backend
/// under `max_length` characters.
pub struct ChunkedTranslator {
    translator: TranslatorBox,
    max_length: usize,
}

impl ChunkedTranslator {
    pub fn new(translator: TranslatorBox, max_length: usize) -> Result<ChunkedTranslator> {
        if max_length == 0 {
            bail!("Translation max length must be greater than 0");
        }

        return Ok(ChunkedTranslator {
            translator,
            max_length,
        });
    }

    pub fn max_length(&self) -> usize {
        return self.max_length;
    }

    /// Detects the language of `text` with the translation backend.
    pub async fn detect(&self, text: &str) -> Result<String, AssistantError> {
        return self
            .translator
            .detect(text)
            .await
            .map_err(AssistantError::from_translation_backend);
    }

    /// Fails on the first chunk the backend can't translate.
    pub async fn try_translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, AssistantError> {
        if text.chars().count() <= self.max_length {
            return self
                .translator
                .translate(text, source, target)
                .await
                .map_err(AssistantError::from_translation_backend);
        }

        let chunks = split_chunks(text, self.max_length);
        tracing::debug!(
            chunks = chunks.len(),
            max_length = self.max_length,
            source = source,
            target = target,
            "Translating in chunks"
        );

        let mut translated_chunks: Vec<String> = vec![];
        for (idx, chunk) in chunks.iter().enumerate() {
            let translated = self
                .translator
                .translate(chunk, source, target)
                .await
                .map_err(|err| {
                    tracing::error!(chunk = idx, error = ?err, "Chunk translation failed");
                    return AssistantError::from_translation_backend(err);
                })?;
            translated_chunks.push(translated);
        }

        return Ok(translated_chunks.join(" "));
    }

    /// Like [`ChunkedTranslator::try_translate`], but reports a failure to the
    /// user and hands back the untranslated text instead of a partial result.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<String> {
        match self.try_translate(text, source, target).await {
            Ok(translated) => return Ok(translated),
            Err(err) => {
                Event::Error(err).notify(tx);
                return Ok(text.to_string());
            }
        }
    }
}
