//! Supported posting languages and the offline keyword detector.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pl,
    De,
}

const POLISH_MARKERS: &[&str] = &["praca", "stanowisko", "wymagania", "doświadczeni"];
const GERMAN_MARKERS: &[&str] = &["stelle", "arbeit", "erfahrung", "kenntnisse"];

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pl => "pl",
            Language::De => "de",
        }
    }

    /// Parses a model reply such as `" PL\n"`. Only exact codes are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "pl" => Some(Language::Pl),
            "de" => Some(Language::De),
            _ => None,
        }
    }

    /// Keyword heuristic: Polish markers are checked before German ones,
    /// first match wins, English otherwise.
    pub fn detect_by_keywords(text: &str) -> Self {
        let lower = text.to_lowercase();
        if POLISH_MARKERS.iter().any(|m| lower.contains(m)) {
            Language::Pl
        } else if GERMAN_MARKERS.iter().any(|m| lower.contains(m)) {
            Language::De
        } else {
            Language::En
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
