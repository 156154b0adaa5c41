use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Languages a lecture video can be published in.
///
/// Korean is the language every lecture is originally uploaded in; all other
/// codes are translations that may or may not exist for a given lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Ko,
    En,
    Zh,
    Vi,
    Th,
    Ja,
}

impl LanguageCode {
    pub const DEFAULT: LanguageCode = LanguageCode::Ko;

    pub const ALL: [LanguageCode; 6] = [
        LanguageCode::Ko,
        LanguageCode::En,
        LanguageCode::Zh,
        LanguageCode::Vi,
        LanguageCode::Th,
        LanguageCode::Ja,
    ];

    /// Languages a Korean title gets translated into.
    pub const TRANSLATION_TARGETS: [LanguageCode; 5] = [
        LanguageCode::En,
        LanguageCode::Zh,
        LanguageCode::Vi,
        LanguageCode::Th,
        LanguageCode::Ja,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::Ko => "ko",
            LanguageCode::En => "en",
            LanguageCode::Zh => "zh",
            LanguageCode::Vi => "vi",
            LanguageCode::Th => "th",
            LanguageCode::Ja => "ja",
        }
    }

    /// Name of the language written in the language itself.
    pub fn native_name(&self) -> &'static str {
        match self {
            LanguageCode::Ko => "한국어",
            LanguageCode::En => "English",
            LanguageCode::Zh => "中文",
            LanguageCode::Vi => "Tiếng Việt",
            LanguageCode::Th => "ไทย",
            LanguageCode::Ja => "日本語",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Lenient parse used for query strings: surrounding whitespace and case
    /// are ignored, anything unrecognised is `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.trim().to_ascii_lowercase().parse().ok()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageCode {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ko" => Ok(LanguageCode::Ko),
            "en" => Ok(LanguageCode::En),
            "zh" => Ok(LanguageCode::Zh),
            "vi" => Ok(LanguageCode::Vi),
            "th" => Ok(LanguageCode::Th),
            "ja" => Ok(LanguageCode::Ja),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
