#[cfg(test)]
#[path = "language_test.rs"]
mod tests;

use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::AssistantError;

/// Languages a case can be summarized in. Everything is summarized in
/// English and translated back.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => return "en",
            Language::Spanish => return "es",
            Language::French => return "fr",
            Language::German => return "de",
        }
    }

    pub fn from_code(code: &str) -> Result<Language, AssistantError> {
        let code = code.trim().to_lowercase();
        return Language::iter()
            .find(|language| return language.code() == code)
            .ok_or(AssistantError::UnsupportedLanguage(code));
    }
}

/// What the user picked as the document language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LanguageSelection {
    English,
    Spanish,
    French,
    German,
    AutoDetect,
}

impl LanguageSelection {
    pub fn parse(text: &str) -> Result<LanguageSelection, AssistantError> {
        let name = text.trim().to_lowercase();
        return LanguageSelection::iter()
            .find(|selection| return selection.to_string() == name)
            .ok_or(AssistantError::UnsupportedLanguage(name));
    }

    /// The fixed language behind a manual selection, `None` for auto-detect.
    pub fn language(&self) -> Option<Language> {
        match self {
            LanguageSelection::English => return Some(Language::English),
            LanguageSelection::Spanish => return Some(Language::Spanish),
            LanguageSelection::French => return Some(Language::French),
            LanguageSelection::German => return Some(Language::German),
            LanguageSelection::AutoDetect => return None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SummarizationLevel {
    Brief,
    Detailed,
}

impl SummarizationLevel {
    pub fn parse(text: &str) -> Option<SummarizationLevel> {
        let name = text.trim().to_lowercase();
        return SummarizationLevel::iter().find(|level| return level.to_string() == name);
    }

    /// Instruction appended to English case text before summarizing.
    pub fn instruction(&self) -> String {
        return format!(" Summarize in a {self} way.");
    }
}
