//! Run-scoped state: the ledger, the created-keyword list and the
//! in-memory keyword inventory.
//!
//! A [`RunContext`] is created at run start and passed by `&mut` through
//! every pipeline step. Nothing here outlives the run.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::traits::report::{ReportSink, ReportTable};
use crate::types::{
    ad_group::AdGroupId,
    keyword::{ExistingKeywords, KeywordRecord},
};

/// Header of the report table.
pub const REPORT_HEADER: [&str; 3] = ["Campaign Name", "Ad Group Name", "Keywords Added"];

/// Header of the log section that follows the report rows.
pub const LOG_SECTION_HEADER: &str = "Execution Log";

/// One ad group that received at least one keyword for a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub campaign_name: String,
    pub ad_group_name: String,
    pub keywords_added: String,
}

/// Append-only log and report rows for one run.
#[derive(Debug, Default)]
pub struct RunLedger {
    lines: Vec<String>,
    rows: Vec<ReportRow>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp and store a log line, mirroring it to the console.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "keyword_harvester::ledger", "{}", message);
        let line = format!("{} - {}", Utc::now().format("%H:%M:%S"), message);
        self.lines.push(line);
    }

    pub fn record_report_row(
        &mut self,
        campaign_name: impl Into<String>,
        ad_group_name: impl Into<String>,
        keywords_added: impl Into<String>,
    ) {
        self.rows.push(ReportRow {
            campaign_name: campaign_name.into(),
            ad_group_name: ad_group_name.into(),
            keywords_added: keywords_added.into(),
        });
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Render the report: header, rows, spacer, log header, log lines.
    pub fn to_table(&self, name: impl Into<String>) -> ReportTable {
        let mut table = ReportTable::new(name);
        table.push_row(REPORT_HEADER);
        for row in &self.rows {
            table.push_row([
                row.campaign_name.as_str(),
                row.ad_group_name.as_str(),
                row.keywords_added.as_str(),
            ]);
        }
        table.push_row(Vec::<String>::new());
        table.push_row([LOG_SECTION_HEADER]);
        for line in &self.lines {
            table.push_row([line.as_str()]);
        }
        table
    }

    /// Write the report to the sink. Called once, at the very end of a run.
    ///
    /// A missing or failing sink is logged and otherwise ignored: every
    /// mutation has already happened by the time this runs.
    pub async fn flush(mut self, sink: Option<&dyn ReportSink>, table_name: &str) -> FlushedLedger {
        let written = match sink {
            None => {
                self.log("Report sink is not configured. Skipping report generation.");
                false
            }
            Some(sink) => {
                let table = self.to_table(table_name);
                match sink.write_table(&table).await {
                    Ok(()) => {
                        self.log(format!("Report successfully written: {}", table_name));
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, table = %table_name, "Report sink failed");
                        self.log(format!(
                            "ERROR: Could not write the report. Check the sink configuration. Details: {}",
                            e
                        ));
                        false
                    }
                }
            }
        };
        self.log("--- RUN FINISHED ---");

        FlushedLedger {
            table_name: table_name.to_string(),
            written,
            lines: self.lines,
            rows: self.rows,
        }
    }
}

/// What remains of a ledger after its single flush.
#[derive(Debug, Clone)]
pub struct FlushedLedger {
    pub table_name: String,
    /// Whether the sink accepted the table.
    pub written: bool,
    pub lines: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl FlushedLedger {
    /// True if any log line contains `needle`.
    pub fn logged(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

/// Existing keywords per ad group, loaded once per run and updated as
/// keywords are created so later terms see them.
#[derive(Debug, Default)]
pub struct KeywordInventory {
    by_ad_group: HashMap<AdGroupId, ExistingKeywords>,
}

impl KeywordInventory {
    pub fn get(&self, ad_group_id: AdGroupId) -> Option<&ExistingKeywords> {
        self.by_ad_group.get(&ad_group_id)
    }

    pub fn get_mut(&mut self, ad_group_id: AdGroupId) -> Option<&mut ExistingKeywords> {
        self.by_ad_group.get_mut(&ad_group_id)
    }

    pub fn insert(&mut self, ad_group_id: AdGroupId, existing: ExistingKeywords) -> &mut ExistingKeywords {
        self.by_ad_group.entry(ad_group_id).or_insert(existing)
    }

    pub fn contains(&self, ad_group_id: AdGroupId) -> bool {
        self.by_ad_group.contains_key(&ad_group_id)
    }
}

/// Everything one run accumulates.
#[derive(Debug)]
pub struct RunContext {
    pub ledger: RunLedger,
    /// Keywords created in this run, in creation order.
    pub created: Vec<KeywordRecord>,
    pub inventory: KeywordInventory,
    /// Lowercase terms already taken through the pipeline.
    pub seen_terms: HashSet<String>,
    /// Calendar day of the run (account time zone), used for the label.
    pub run_date: NaiveDate,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(run_date: NaiveDate) -> Self {
        Self::starting_at(run_date, Utc::now())
    }

    pub fn starting_at(run_date: NaiveDate, started_at: DateTime<Utc>) -> Self {
        Self {
            ledger: RunLedger::new(),
            created: Vec::new(),
            inventory: KeywordInventory::default(),
            seen_terms: HashSet::new(),
            run_date,
            started_at,
        }
    }

    /// Shorthand for `self.ledger.log(..)`.
    pub fn log(&mut self, message: impl Into<String>) {
        self.ledger.log(message);
    }

    /// Report name: account name plus run start, `YYYY-MM-DD HH:MM` (UTC).
    pub fn table_name(&self, account_name: &str) -> String {
        format!("{} {}", account_name, self.started_at.format("%Y-%m-%d %H:%M"))
    }
}
