#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use std::path;

/// Where the case text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentInput {
    File(path::PathBuf),
    Text(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    /// Picks the extractor from the file extension, falling back to the
    /// leading magic bytes for files without a known extension.
    pub fn detect(file_path: &path::Path, bytes: &[u8]) -> DocumentKind {
        let extension = file_path
            .extension()
            .map(|ext| return ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => return DocumentKind::Pdf,
            "docx" => return DocumentKind::Docx,
            _ => {}
        }

        if bytes.starts_with(b"%PDF") {
            return DocumentKind::Pdf;
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return DocumentKind::Docx;
        }

        return DocumentKind::Text;
    }
}
