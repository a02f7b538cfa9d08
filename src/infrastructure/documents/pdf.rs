#[cfg(test)]
#[path = "pdf_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;

/// Extracts the text of every page and joins the pages with a single space.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|err| return anyhow!("Failed to extract text from PDF: {err}"))?;

    return Ok(pages.join(" "));
}
