//! CLI for one harvesting run against an account snapshot.
//!
//! Reads the account state from a JSON snapshot, asks the configured
//! OpenAI-compatible endpoint for language and ad-group decisions, and
//! writes the run report as CSV when a report directory is given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use keyword_harvester::{
    CsvReportSink, HarvestConfig, Harvester, MemoryPlatform, OpenAiOracle, ReportSink, RunContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Turn converting search terms into ad-group keywords")]
struct Cli {
    /// Account snapshot (JSON) to run against
    #[arg(long)]
    snapshot: PathBuf,

    /// Directory for the CSV run report; without it no report is written
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Save the mutated snapshot back to `--snapshot`
    #[arg(long)]
    write_back: bool,

    /// Run date (YYYY-MM-DD), defaults to today (UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Campaign name filter, overrides HARVEST_CAMPAIGN_FILTER
    #[arg(long)]
    campaign_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,keyword_harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = HarvestConfig::from_env_with_filter(cli.campaign_filter.clone())
        .context("Failed to load configuration")?;
    tracing::info!(filter = %config.campaign_name_filter, model = %config.model, "Configuration loaded");

    let oracle = OpenAiOracle::from_env().context("Failed to configure the oracle")?;
    let platform = MemoryPlatform::load(&cli.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", cli.snapshot.display()))?;

    let sink = cli.report_dir.clone().map(CsvReportSink::new);
    let run_date = cli.date.unwrap_or_else(|| Utc::now().date_naive());

    let harvester = Harvester::new(platform, oracle, config);
    let report = harvester
        .harvest(
            RunContext::new(run_date),
            sink.as_ref().map(|s| s as &dyn ReportSink),
        )
        .await;

    if cli.write_back {
        harvester
            .platform()
            .save(&cli.snapshot)
            .with_context(|| format!("Failed to write snapshot {}", cli.snapshot.display()))?;
        tracing::info!(path = %cli.snapshot.display(), "Snapshot written back");
    }

    let summary = report.summary;
    tracing::info!(
        campaigns = summary.campaigns,
        terms_seen = summary.terms_seen,
        terms_processed = summary.terms_processed,
        keywords_created = summary.keywords_created,
        keywords_labelled = summary.keywords_labelled,
        report_rows = summary.report_rows,
        report_written = report.ledger.written,
        "Run complete"
    );

    Ok(())
}
