//! Search-Term Keyword Harvester
//!
//! Triage converting search terms from an ads account into new keywords on
//! the existing ad-group structure.
//!
//! # Design
//!
//! - Two oracles decide: a language classifier and a semantic ad-group matcher
//! - Both answers are validated against a closed set, with a fixed fallback
//! - Keyword creation is duplicate-safe per match type, within and across runs
//! - One report and one day-scoped label per run
//! - Nothing inside a run aborts it; failures are logged to the run ledger
//!
//! # Usage
//!
//! ```rust,ignore
//! use keyword_harvester::{Harvester, HarvestConfig, MemoryPlatform, OpenAiOracle, RunContext};
//!
//! let platform = MemoryPlatform::load("account.json")?;
//! let oracle = OpenAiOracle::from_env()?;
//! let harvester = Harvester::new(platform, oracle, HarvestConfig::from_env()?);
//!
//! let report = harvester.harvest(RunContext::new(today), None).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (Oracle, platform, ReportSink)
//! - [`types`] - Terms, languages, keywords and ad groups
//! - [`pipeline`] - The triage steps and the [`Harvester`] orchestrator
//! - [`ledger`] - Run-scoped log, report rows and keyword inventory
//! - [`oracle`] - OpenAI-compatible oracle transport
//! - [`platform`] - In-memory, snapshot-backed ads platform
//! - [`sinks`] - Report sinks (memory, CSV)
//! - [`testing`] - Scripted oracle for tests

pub mod config;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod pipeline;
pub mod platform;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{CampaignRouting, HarvestConfig};
pub use error::{HarvestError, OracleError, OracleResult, Result};
pub use ledger::{FlushedLedger, ReportRow, RunContext, RunLedger};
pub use oracle::OpenAiOracle;
pub use pipeline::{HarvestReport, Harvester, RunSummary};
pub use platform::{AccountSnapshot, EntityStatus, MemoryPlatform};
pub use sinks::{CsvReportSink, MemoryReportSink};
pub use traits::{
    oracle::{Oracle, OracleOutcome, OracleRequest, OracleTask},
    platform::{AdsPlatform, EnumerationSource, KeywordSink, LabelSink},
    report::{ReportSink, ReportTable},
};
pub use types::{
    ad_group::{AdGroup, AdGroupCandidate, AdGroupId, Campaign, CampaignId, CandidateSet},
    keyword::{ExistingKeywords, Keyword, KeywordId, KeywordMutationRequest, KeywordRecord, Label, MatchType},
    language::Language,
    term::{DateRange, SearchTerm},
};
