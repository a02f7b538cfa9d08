#[cfg(test)]
#[path = "citations_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"\b\d+\s+[A-Z]+\.\s+\d+\b").unwrap());

const SCHOLAR_URL: &str = "https://scholar.google.com/scholar";

pub struct Citations {}

impl Citations {
    /// Every citation shaped substring of `text`, left to right. Repeats are
    /// kept. The reporter must be capitals followed by exactly one period, so
    /// `410 F. 113` matches while `347 U.S. 483` does not.
    pub fn find(text: &str) -> Vec<String> {
        return CITATION_RE
            .find_iter(text)
            .map(|found| return found.as_str().to_string())
            .collect();
    }

    pub fn scholar_link(citation: &str) -> String {
        return match Url::parse_with_params(SCHOLAR_URL, &[("q", citation)]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{SCHOLAR_URL}?q={citation}"),
        };
    }

    /// Markdown list linking each citation to a scholarly search.
    pub fn format(citations: &[String]) -> String {
        if citations.is_empty() {
            return "No legal citations found.".to_string();
        }

        let links = citations
            .iter()
            .map(|citation| {
                return format!("- [{citation}]({})", Citations::scholar_link(citation));
            })
            .collect::<Vec<String>>()
            .join("\n");

        return format!("Found Legal Citations:\n{links}");
    }
}
