//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). None of these abort a
//! run: the pipeline catches them at the call site, logs them to the run
//! ledger and moves on to the documented fallback.

use thiserror::Error;

/// Errors raised by the platform collaborators, the report sink and config.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Enumeration or label operation against the ads platform failed
    #[error("platform error: {0}")]
    Platform(String),

    /// The platform refused a keyword creation
    #[error("mutation rejected: {}", reasons.join(", "))]
    MutationRejected { reasons: Vec<String> },

    /// Report sink missing, misconfigured or failing
    #[error("report sink unavailable: {0}")]
    ReportSink(String),

    /// Invalid or missing configuration
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    /// Build a rejection from the platform's reason list.
    pub fn rejected(reasons: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::MutationRejected {
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors from an oracle call. Every variant counts as "oracle unavailable".
#[derive(Debug, Error)]
pub enum OracleError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure (connection refused, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for oracle calls.
pub type OracleResult<T> = std::result::Result<T, OracleError>;
