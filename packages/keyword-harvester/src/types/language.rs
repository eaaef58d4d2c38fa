//! Closed language vocabulary used for campaign routing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language decision for a search term.
///
/// Produced exactly once per term. `Other` is both a legitimate answer and
/// the safe default when the classifier cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fr,
    It,
    Es,
    De,
    Zh,
    Other,
}

impl Language {
    /// The five languages that route to language-marked campaigns.
    pub const SPECIFIC: [Language; 5] = [
        Language::Fr,
        Language::It,
        Language::Es,
        Language::De,
        Language::Zh,
    ];

    /// Wire code, as the classifier is asked to return it.
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::It => "it",
            Language::Es => "es",
            Language::De => "de",
            Language::Zh => "zh",
            Language::Other => "other",
        }
    }

    /// Strict vocabulary membership. Surrounding whitespace, case and a
    /// single pair of quotes are tolerated; anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        match token.to_lowercase().as_str() {
            "fr" => Some(Language::Fr),
            "it" => Some(Language::It),
            "es" => Some(Language::Es),
            "de" => Some(Language::De),
            "zh" => Some(Language::Zh),
            "other" => Some(Language::Other),
            _ => None,
        }
    }

    pub fn is_specific(self) -> bool {
        self != Language::Other
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
