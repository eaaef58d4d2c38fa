//! Oracle trait for the two external decision services.
//!
//! An oracle receives a single-turn prompt and returns free text. Whether
//! that text is usable is decided by the caller, which folds the call into
//! an [`OracleOutcome`] and applies its fallback in one place.

use async_trait::async_trait;
use std::fmt;

use crate::error::OracleResult;

/// Which decision the oracle is asked to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleTask {
    ClassifyLanguage,
    MatchAdGroup,
}

impl fmt::Display for OracleTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OracleTask::ClassifyLanguage => "language classification",
            OracleTask::MatchAdGroup => "ad group matching",
        })
    }
}

/// A single-shot oracle request.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    pub task: OracleTask,
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// External text oracle. Each request is attempted exactly once.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send the request and return the raw response content.
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String>;
}

/// Tagged result of one oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleOutcome<T> {
    /// Response validated against the expected vocabulary.
    Success(T),
    /// Response arrived but is outside the expected vocabulary.
    Invalid(String),
    /// Transport failure, non-success status or malformed payload.
    Unavailable(String),
}

impl<T> OracleOutcome<T> {
    /// Fold a raw oracle result through a validator.
    pub fn from_response<E: fmt::Display>(
        response: Result<String, E>,
        validate: impl FnOnce(&str) -> Option<T>,
    ) -> Self {
        match response {
            Ok(raw) => match validate(&raw) {
                Some(value) => OracleOutcome::Success(value),
                None => OracleOutcome::Invalid(raw),
            },
            Err(err) => OracleOutcome::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;

    #[test]
    fn test_outcome_tags() {
        let ok: OracleOutcome<u8> =
            OracleOutcome::from_response(Ok::<_, OracleError>("7".into()), |s| s.parse().ok());
        assert_eq!(ok, OracleOutcome::Success(7));

        let invalid: OracleOutcome<u8> =
            OracleOutcome::from_response(Ok::<_, OracleError>("seven".into()), |s| s.parse().ok());
        assert_eq!(invalid, OracleOutcome::Invalid("seven".into()));

        let down: OracleOutcome<u8> = OracleOutcome::from_response(
            Err(OracleError::Network("connection reset".into())),
            |s| s.parse().ok(),
        );
        assert!(matches!(down, OracleOutcome::Unavailable(ref r) if r.contains("connection reset")));
    }
}
