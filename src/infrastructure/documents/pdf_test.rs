use super::extract_text;

#[test]
fn it_fails_on_bytes_that_are_not_a_pdf() {
    let err = extract_text(b"not a pdf").unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Failed to extract text from PDF"));
}

