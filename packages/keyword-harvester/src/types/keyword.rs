//! Keyword vocabulary: match types, mutation requests and the existing
//! keyword inventory used for duplicate checks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ad_group::AdGroupId;

/// Platform identifier of a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordId(pub i64);

/// Keyword matching strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    /// Match types the harvester creates, in creation order.
    pub const HARVESTED: [MatchType; 2] = [MatchType::Exact, MatchType::Phrase];

    /// Wrap a term in this match type's delimiters: `[term]`, `"term"`.
    pub fn keyword_text(self, term: &str) -> String {
        match self {
            MatchType::Exact => format!("[{}]", term),
            MatchType::Phrase => format!("\"{}\"", term),
            MatchType::Broad => term.to_string(),
        }
    }

    /// Label used in ledger lines.
    pub fn display_name(self) -> &'static str {
        match self {
            MatchType::Exact => "[Exact Match]",
            MatchType::Phrase => "\"Phrase Match\"",
            MatchType::Broad => "Broad Match",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchType::Exact => "EXACT",
            MatchType::Phrase => "PHRASE",
            MatchType::Broad => "BROAD",
        })
    }
}

/// Strip match-type delimiters and broad-match modifiers, trim, lowercase.
pub fn normalize_keyword_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = if let Some(stripped) = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
    {
        stripped
    } else if let Some(stripped) = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        stripped
    } else {
        trimmed
    };
    inner
        .split_whitespace()
        .map(|word| word.trim_start_matches('+'))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A keyword as the platform reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: KeywordId,
    pub text: String,
    pub match_type: MatchType,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Existing exact and phrase keyword texts of one ad group.
///
/// Both sets hold only trimmed, lowercase text, so membership is
/// case-insensitive by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingKeywords {
    exact: HashSet<String>,
    phrase: HashSet<String>,
}

impl ExistingKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the inventory from platform keywords. Broad match is ignored.
    pub fn from_keywords<'a>(keywords: impl IntoIterator<Item = &'a Keyword>) -> Self {
        let mut existing = Self::new();
        for keyword in keywords {
            existing.insert(keyword.match_type, &keyword.text);
        }
        existing
    }

    pub fn contains(&self, match_type: MatchType, text: &str) -> bool {
        let normalized = normalize_keyword_text(text);
        match match_type {
            MatchType::Exact => self.exact.contains(&normalized),
            MatchType::Phrase => self.phrase.contains(&normalized),
            MatchType::Broad => false,
        }
    }

    /// Record a keyword text. Returns false for broad match.
    pub fn insert(&mut self, match_type: MatchType, text: &str) -> bool {
        let normalized = normalize_keyword_text(text);
        match match_type {
            MatchType::Exact => self.exact.insert(normalized),
            MatchType::Phrase => self.phrase.insert(normalized),
            MatchType::Broad => false,
        }
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.phrase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request sent to the keyword-mutation sink.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMutationRequest {
    pub ad_group_id: AdGroupId,
    /// Delimited keyword text, e.g. `[blue shoes]`
    pub text: String,
    pub match_type: MatchType,
    pub bid: f64,
}

impl KeywordMutationRequest {
    pub fn new(ad_group_id: AdGroupId, term: &str, match_type: MatchType, bid: f64) -> Self {
        Self {
            ad_group_id,
            text: match_type.keyword_text(term),
            match_type,
            bid,
        }
    }
}

/// A keyword created during the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecord {
    pub id: KeywordId,
    pub ad_group_id: AdGroupId,
    pub text: String,
    pub match_type: MatchType,
}

/// A label entity on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub description: String,
}
