//! Search terms and the lookback window they are read from.

use chrono::{Duration, NaiveDate};
use std::fmt;

/// A trimmed search term.
///
/// The display text keeps its original case (it becomes the keyword text);
/// every comparison goes through [`SearchTerm::normalized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    normalized: String,
}

impl SearchTerm {
    /// Trim the raw text. Returns `None` when nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            normalized: text.to_lowercase(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercase projection used for every comparison.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Inclusive date window for the search-term performance feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Window ending `today` and starting `days` earlier, clamped to the
    /// earliest representable date.
    pub fn lookback(days: u32, today: NaiveDate) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    /// Platform query form: `YYYYMMDD,YYYYMMDD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}
