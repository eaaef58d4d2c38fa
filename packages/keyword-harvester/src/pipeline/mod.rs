//! Triage pipeline.
//!
//! Each step takes the run's [`RunContext`](crate::ledger::RunContext) by
//! `&mut` and never fails: problems are logged and routed to a fallback.
//! [`Harvester`] strings the steps together.

pub mod classify;
pub mod harvester;
pub mod keywords;
pub mod label;
pub mod matcher;
pub mod normalize;
pub mod prompts;
pub mod resolve;

pub use classify::classify_language;
pub use harvester::{HarvestReport, Harvester, RunSummary};
pub use keywords::add_keywords;
pub use label::{apply_run_label, run_label_name, RUN_LABEL_DESCRIPTION};
pub use matcher::{find_candidate, select_best_match};
pub use normalize::normalize_term;
pub use prompts::{format_classify_prompt, format_match_prompt, CLASSIFY_SYSTEM_PROMPT, MATCH_SYSTEM_PROMPT};
pub use resolve::resolve_candidates;
