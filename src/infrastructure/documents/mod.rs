pub mod docx;
pub mod pdf;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use anyhow::Result;
use tokio::fs;

use crate::domain::models::DocumentInput;
use crate::domain::models::DocumentKind;

pub struct DocumentLoader {}

impl DocumentLoader {
    /// Returns the raw case text for a file or pasted text. Pasted text is
    /// passed through untouched.
    pub async fn load(input: DocumentInput) -> Result<String> {
        let file_path = match input {
            DocumentInput::Text(text) => return Ok(text),
            DocumentInput::File(file_path) => file_path,
        };

        let bytes = fs::read(&file_path).await?;
        let kind = DocumentKind::detect(&file_path, &bytes);
        tracing::debug!(
            path = %file_path.display(),
            kind = %kind,
            size = bytes.len(),
            "Loading document"
        );

        let text = match kind {
            DocumentKind::Pdf => pdf::extract_text(&bytes)?,
            DocumentKind::Docx => docx::extract_text(&bytes)?,
            DocumentKind::Text => String::from_utf8(bytes)?,
        };

        return Ok(text);
    }
}
