//! The Harvester - main entry point for a run.
//!
//! For each enabled campaign matching the name filter, every converting
//! search term in the lookback window flows through:
//! - normalization (trim, blank and repeat rejection)
//! - language classification
//! - candidate ad-group resolution
//! - best-match selection
//! - duplicate-safe keyword creation, fanned out over every ad group that
//!   shares the matched name
//!
//! After all terms, the keywords created in the run are labelled once and
//! the ledger is flushed once. Nothing inside a run aborts it.

use tracing::{debug, info};

use crate::config::HarvestConfig;
use crate::ledger::{FlushedLedger, RunContext};
use crate::pipeline::{
    classify::classify_language, keywords::add_keywords, label::apply_run_label,
    matcher::select_best_match, normalize::normalize_term, resolve::resolve_candidates,
};
use crate::traits::{oracle::Oracle, platform::AdsPlatform, report::ReportSink};
use crate::types::{ad_group::Campaign, term::DateRange};

/// Fallback account name for the report when the platform cannot say.
const UNKNOWN_ACCOUNT: &str = "Unknown account";

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Campaigns whose search terms were read.
    pub campaigns: usize,
    /// Raw terms received from the search-term feed.
    pub terms_seen: usize,
    /// Terms that survived normalization and reached the classifier.
    pub terms_processed: usize,
    pub keywords_created: usize,
    pub report_rows: usize,
    pub keywords_labelled: usize,
}

/// Result of [`Harvester::harvest`]: the counters and the flushed ledger.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub summary: RunSummary,
    pub ledger: FlushedLedger,
}

/// Runs the search-term triage against one account.
///
/// # Example
///
/// ```rust,ignore
/// let harvester = Harvester::new(platform, oracle, HarvestConfig::from_env()?);
/// let ctx = RunContext::new(today);
/// let report = harvester.harvest(ctx, Some(&sink)).await;
/// println!("{} keywords created", report.summary.keywords_created);
/// ```
pub struct Harvester<P: AdsPlatform, O: Oracle> {
    platform: P,
    oracle: O,
    config: HarvestConfig,
}

impl<P: AdsPlatform, O: Oracle> Harvester<P, O> {
    pub fn new(platform: P, oracle: O, config: HarvestConfig) -> Self {
        Self {
            platform,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Process every campaign and term, then label the created keywords.
    ///
    /// The ledger in `ctx` is left unflushed; see [`Harvester::harvest`].
    pub async fn run(&self, ctx: &mut RunContext) -> RunSummary {
        let mut summary = RunSummary::default();
        let range = DateRange::lookback(self.config.lookback_days, ctx.run_date);
        let filter = &self.config.campaign_name_filter;

        let campaigns = match self.platform.enabled_campaigns(filter).await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                ctx.log(format!("ERROR: Could not list campaigns containing '{}': {}", filter, e));
                Vec::new()
            }
        };

        if campaigns.is_empty() {
            ctx.log(format!(
                "No enabled campaigns found containing '{}'. Run terminated.",
                filter
            ));
            return summary;
        }

        info!(campaigns = campaigns.len(), range = %range, "Starting harvest");

        for campaign in &campaigns {
            self.process_campaign(ctx, campaign, &range, &mut summary).await;
        }

        summary.keywords_created = ctx.created.len();
        summary.keywords_labelled = apply_run_label(&self.platform, ctx).await;
        summary.report_rows = ctx.ledger.rows().len();
        summary
    }

    /// [`Harvester::run`], then flush the ledger to `sink` under a table
    /// named for the account and run start.
    pub async fn harvest(&self, mut ctx: RunContext, sink: Option<&dyn ReportSink>) -> HarvestReport {
        let summary = self.run(&mut ctx).await;

        let account = match self.platform.account_name().await {
            Ok(name) => name,
            Err(e) => {
                ctx.log(format!("ERROR: Could not read the account name: {}", e));
                UNKNOWN_ACCOUNT.to_string()
            }
        };
        let table_name = ctx.table_name(&account);

        info!(
            campaigns = summary.campaigns,
            terms = summary.terms_processed,
            created = summary.keywords_created,
            "Harvest finished"
        );

        let ledger = ctx.ledger.flush(sink, &table_name).await;
        HarvestReport { summary, ledger }
    }

    async fn process_campaign(
        &self,
        ctx: &mut RunContext,
        campaign: &Campaign,
        range: &DateRange,
        summary: &mut RunSummary,
    ) {
        ctx.log(format!("Processing Campaign: {}", campaign.name));
        summary.campaigns += 1;

        let terms = match self.platform.converting_search_terms(campaign, range).await {
            Ok(terms) => terms,
            Err(e) => {
                ctx.log(format!(
                    "ERROR: Could not read search terms of campaign '{}': {}",
                    campaign.name, e
                ));
                return;
            }
        };
        debug!(campaign = %campaign.name, terms = terms.len(), "Search terms loaded");

        for raw in &terms {
            summary.terms_seen += 1;
            if self.process_term(ctx, raw).await {
                summary.terms_processed += 1;
            }
        }
    }

    /// Take one raw term through the pipeline. Returns false when the term
    /// was dropped by normalization.
    async fn process_term(&self, ctx: &mut RunContext, raw: &str) -> bool {
        let Some(term) = normalize_term(ctx, raw) else {
            return false;
        };

        let language = classify_language(&self.oracle, &self.config, ctx, &term).await;

        let candidates = resolve_candidates(&self.platform, &self.config, ctx, language).await;
        if candidates.is_empty() {
            return true;
        }

        let names = candidates.ordered_names();
        let best = select_best_match(&self.oracle, &self.config, ctx, &term, &names).await;
        ctx.log(format!(
            "For search term \"{}\" ({}), best matching ad group name is: {}",
            term, language, best
        ));

        for ad_group in candidates.candidates(&best) {
            let added = add_keywords(&self.platform, &self.config, ctx, ad_group, &term).await;
            if !added.is_empty() {
                ctx.ledger
                    .record_report_row(&ad_group.campaign_name, &ad_group.name, added);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{EntityStatus, MemoryPlatform};
    use crate::testing::MockOracle;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_no_campaigns_ends_run_early() {
        let harvester = Harvester::new(MemoryPlatform::new("Acme"), MockOracle::new(), HarvestConfig::new("Brand"));
        let mut ctx = RunContext::new(day(10));

        let summary = harvester.run(&mut ctx).await;

        assert_eq!(summary, RunSummary::default());
        assert!(ctx.ledger.lines()[0].contains("No enabled campaigns found containing 'Brand'. Run terminated."));
        assert!(harvester.oracle().calls().is_empty());
    }

    #[tokio::test]
    async fn test_counts_terms_and_keywords() {
        let platform = MemoryPlatform::new("Acme")
            .with_campaign(1, "Brand-FR", EntityStatus::Enabled)
            .with_ad_group(1, 10, "Chaussures", EntityStatus::Enabled)
            .with_search_term(1, "chaussures rouges", day(8), 2.0)
            .with_search_term(1, "Chaussures Rouges ", day(9), 1.0)
            .with_search_term(1, "   ", day(9), 1.0);
        let oracle = MockOracle::new()
            .with_language("chaussures rouges", "fr")
            .with_match("chaussures rouges", "chaussures");
        let harvester = Harvester::new(platform, oracle, HarvestConfig::new("Brand"));
        let mut ctx = RunContext::new(day(10));

        let summary = harvester.run(&mut ctx).await;

        assert_eq!(summary.campaigns, 1);
        assert_eq!(summary.terms_seen, 3);
        assert_eq!(summary.terms_processed, 1);
        assert_eq!(summary.keywords_created, 2);
        assert_eq!(summary.report_rows, 1);
        assert_eq!(summary.keywords_labelled, 2);
        assert_eq!(ctx.ledger.rows()[0].keywords_added, "[chaussures rouges], \"chaussures rouges\"");
    }

    #[tokio::test]
    async fn test_unbounded_lookback_reads_all_terms() {
        let platform = MemoryPlatform::new("Acme")
            .with_campaign(1, "Brand-FR", EntityStatus::Enabled)
            .with_ad_group(1, 10, "Chaussures", EntityStatus::Enabled)
            .with_search_term(1, "chaussures rouges", NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(), 1.0);
        let oracle = MockOracle::new()
            .with_language("chaussures rouges", "fr")
            .with_match("chaussures rouges", "chaussures");
        let config = HarvestConfig::new("Brand").with_lookback_days(u32::MAX);
        let harvester = Harvester::new(platform, oracle, config);
        let mut ctx = RunContext::new(day(10));

        let summary = harvester.run(&mut ctx).await;

        assert_eq!(summary.terms_seen, 1);
        assert_eq!(summary.terms_processed, 1);
        assert_eq!(summary.keywords_created, 2);
    }

    #[tokio::test]
    async fn test_harvest_without_sink_still_finishes() {
        let platform = MemoryPlatform::new("Acme");
        let harvester = Harvester::new(platform, MockOracle::new(), HarvestConfig::new("Brand"));
        let started = chrono::Utc::now();
        let ctx = RunContext::starting_at(day(10), started);

        let report = harvester.harvest(ctx, None).await;

        assert!(report.ledger.table_name.starts_with("Acme "));
        assert!(report.ledger.logged("not configured"));
        assert!(report.ledger.lines.last().unwrap().ends_with("--- RUN FINISHED ---"));
    }
}
