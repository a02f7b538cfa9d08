use std::io::Cursor;
use std::io::Write;

use zip::write::FileOptions;
use zip::ZipWriter;

pub fn case_fixture() -> &'static str {
    return r#"
The plaintiff appeals the dismissal of her claim under the Fair Housing Act.

The district court relied on 347 F. 483 for the proposition that intent must be shown, and again on 410 F. 113 when rejecting the disparate impact theory. Both readings were too narrow.

Compare Brown v. Board of Education, 347 U.S. 483 (1954), which the appellant cites at length.

We reverse and remand. See 347 F. 483.
"#
    .trim();
}

fn escape_xml(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
}

/// Builds an in-memory DOCX package whose body holds one paragraph per
/// entry. Each paragraph is split into two runs to mimic word processors
/// breaking text across formatting boundaries.
pub fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    let body = paragraphs
        .iter()
        .map(|paragraph| {
            let text = escape_xml(paragraph);
            let split_at = text
                .char_indices()
                .map(|(idx, _)| return idx)
                .nth(text.chars().count() / 2)
                .unwrap_or(text.len());
            let (first, second) = text.split_at(split_at);
            return format!(
                r#"<w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:t xml:space="preserve">{first}</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{second}</w:t></w:r></w:p>"#
            );
        })
        .collect::<Vec<String>>()
        .join("");

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", FileOptions::default())
        .unwrap();
    zip.write_all(document.as_bytes()).unwrap();

    return zip.finish().unwrap().into_inner();
}
