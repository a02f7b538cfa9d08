#[cfg(test)]
#[path = "docx_test.rs"]
mod tests;

use std::io::Cursor;
use std::io::Read;

use anyhow::Context;
use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part out of the DOCX container and flattens it to
/// text, one space between paragraphs.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("DOCX file is not a valid zip archive")?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| return format!("DOCX file has no {DOCUMENT_PART}"))?
        .read_to_string(&mut xml)?;

    return paragraphs(&xml).map(|paragraphs| return paragraphs.join(" "));
}

fn parent_is(elements: &[Vec<u8>], name: &[u8]) -> bool {
    return elements.last().map(|e| return e.as_slice()) == Some(name);
}

/// Flattens `w:p` paragraphs to text. Paragraphs nested in text boxes are
/// kept apart from the one holding the box. Tabs and breaks only count as
/// run content, so tab stop definitions in paragraph properties are ignored.
fn paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs: Vec<String> = vec![];
    let mut open_paragraphs: Vec<String> = vec![];
    let mut elements: Vec<Vec<u8>> = vec![];

    loop {
        match reader.read_event()? {
            Event::Start(el) => {
                let name = el.name().as_ref().to_vec();
                if name == b"w:p" {
                    open_paragraphs.push(String::new());
                }
                elements.push(name);
            }
            Event::Empty(el) => {
                let in_run = parent_is(&elements, b"w:r");
                let current = open_paragraphs.last_mut();
                match (el.name().as_ref(), current) {
                    (b"w:p", _) => paragraphs.push(String::new()),
                    (b"w:tab", Some(current)) if in_run => current.push('\t'),
                    (b"w:br" | b"w:cr", Some(current)) if in_run => current.push('\n'),
                    _ => {}
                }
            }
            Event::Text(text) => {
                let in_text = parent_is(&elements, b"w:t");
                if let (true, Some(current)) = (in_text, open_paragraphs.last_mut()) {
                    current.push_str(&text.unescape()?);
                }
            }
            Event::End(el) => {
                elements.pop();
                if el.name().as_ref() == b"w:p" {
                    if let Some(paragraph) = open_paragraphs.pop() {
                        paragraphs.push(paragraph);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    return Ok(paragraphs);
}
