//! End-to-end runs against the in-memory platform and a scripted oracle.

use chrono::{NaiveDate, TimeZone, Utc};
use keyword_harvester::ledger::{LOG_SECTION_HEADER, REPORT_HEADER};
use keyword_harvester::testing::MockOracle;
use keyword_harvester::{
    AdGroupId, CsvReportSink, EntityStatus, HarvestConfig, Harvester, MatchType, MemoryPlatform,
    MemoryReportSink, OracleTask, ReportSink, RunContext,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn ctx() -> RunContext {
    let started = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();
    RunContext::starting_at(day(10), started)
}

/// French campaign with two ad groups, unmarked campaign with two more.
fn account() -> MemoryPlatform {
    MemoryPlatform::new("Acme")
        .with_campaign(1, "Brand-FR-Summer", EntityStatus::Enabled)
        .with_campaign(2, "Brand-Summer", EntityStatus::Enabled)
        .with_campaign(3, "Generic-Summer", EntityStatus::Enabled)
        .with_ad_group(1, 10, "Chaussures Femme", EntityStatus::Enabled)
        .with_ad_group(1, 11, "Chaussures Homme", EntityStatus::Enabled)
        .with_ad_group(2, 20, "Shoes - Red", EntityStatus::Enabled)
        .with_ad_group(2, 21, "Shoes - Blue", EntityStatus::Enabled)
        .with_ad_group(3, 30, "Shoes - Red", EntityStatus::Enabled)
}

fn harvester(platform: MemoryPlatform, oracle: MockOracle) -> Harvester<MemoryPlatform, MockOracle> {
    Harvester::new(platform, oracle, HarvestConfig::new("Brand"))
}

#[tokio::test]
async fn test_second_run_makes_no_mutation_calls() {
    let platform = account()
        .with_search_term(1, "chaussures femme rouges", day(8), 1.0)
        .with_search_term(2, "red sneakers", day(9), 2.0);
    let oracle = MockOracle::new()
        .with_language("chaussures femme rouges", "fr")
        .with_match("chaussures femme rouges", "Chaussures Femme")
        .with_language("red sneakers", "other")
        .with_match("red sneakers", "shoes - red");
    let harvester = harvester(platform.clone(), oracle);

    let first = harvester.run(&mut ctx()).await;
    assert_eq!(first.keywords_created, 4);
    assert_eq!(platform.create_calls(), 4);

    let report = harvester.harvest(ctx(), None).await;
    assert_eq!(report.summary.keywords_created, 0);
    assert_eq!(report.summary.terms_processed, 2);
    assert_eq!(platform.create_calls(), 4);
    assert!(report.ledger.rows.is_empty());
    assert!(report.ledger.logged("No new keywords were created. Skipping labeling."));
}

#[tokio::test]
async fn test_failing_classifier_routes_to_other() {
    let platform = account().with_search_term(2, "xyz123", day(9), 1.0);
    let oracle = MockOracle::new()
        .failing(OracleTask::ClassifyLanguage, "xyz123")
        .with_match("xyz123", "shoes - blue");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert!(report.ledger.logged("Search term: \"xyz123\" was identified as language: other"));
    let rows = &report.ledger.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].campaign_name, "Brand-Summer");
    assert_eq!(rows[0].ad_group_name, "Shoes - Blue");
    assert_eq!(platform.ad_group_keywords(AdGroupId(21)).unwrap().len(), 2);
}

#[tokio::test]
async fn test_out_of_vocabulary_language_routes_to_other() {
    let platform = account().with_search_term(1, "blue shoes", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("blue shoes", "en")
        .with_match("blue shoes", "shoes - blue");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert!(report.ledger.logged("unexpected answer"));
    assert!(report.ledger.logged("identified as language: other"));
    assert_eq!(platform.ad_group_keywords(AdGroupId(21)).unwrap().len(), 2);
}

#[tokio::test]
async fn test_unlisted_match_falls_back_to_first_candidate() {
    let platform = account().with_search_term(2, "red sneakers", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("red sneakers", "other")
        .with_match("red sneakers", "Sneakers - Green");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert!(report.ledger.logged("Defaulting to first option: shoes - red"));
    assert!(report
        .ledger
        .logged("For search term \"red sneakers\" (other), best matching ad group name is: shoes - red"));
    assert_eq!(platform.ad_group_keywords(AdGroupId(20)).unwrap().len(), 2);
    assert!(platform.ad_group_keywords(AdGroupId(21)).unwrap().is_empty());
}

#[tokio::test]
async fn test_verbose_match_selects_named_candidate() {
    let platform = account().with_search_term(1, "chaussures femme", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("chaussures femme", "fr")
        .with_match("chaussures femme", "I'd recommend chaussures homme");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert_eq!(report.ledger.rows.len(), 1);
    assert_eq!(report.ledger.rows[0].ad_group_name, "Chaussures Homme");
    assert!(platform.ad_group_keywords(AdGroupId(10)).unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_exact_only_adds_phrase() {
    let platform = account()
        .with_keyword(21, "blue shoes", MatchType::Exact)
        .with_search_term(2, "Blue Shoes", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("Blue Shoes", "other")
        .with_match("Blue Shoes", "shoes - blue");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert_eq!(platform.create_calls(), 1);
    assert_eq!(report.ledger.rows.len(), 1);
    assert_eq!(report.ledger.rows[0].keywords_added, "\"Blue Shoes\"");

    let keywords = platform.ad_group_keywords(AdGroupId(21)).unwrap();
    let phrase: Vec<_> = keywords
        .iter()
        .filter(|k| k.match_type == MatchType::Phrase)
        .collect();
    assert_eq!(phrase.len(), 1);
    assert_eq!(phrase[0].text, "\"Blue Shoes\"");
}

#[tokio::test]
async fn test_fully_covered_term_is_logged_without_row() {
    let platform = account()
        .with_keyword(21, "[blue shoes]", MatchType::Exact)
        .with_keyword(21, "\"blue shoes\"", MatchType::Phrase)
        .with_search_term(2, "Blue Shoes", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("Blue Shoes", "other")
        .with_match("Blue Shoes", "shoes - blue");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert_eq!(platform.create_calls(), 0);
    assert!(report.ledger.rows.is_empty());
    assert_eq!(report.summary.report_rows, 0);
    assert!(report.ledger.logged("Search term: \"Blue Shoes\" was identified as language: other"));
    assert!(report.ledger.logged("already present in Ad Group 'Shoes - Blue'"));
}

#[tokio::test]
async fn test_same_day_runs_share_one_label() {
    let platform = account().with_search_term(1, "chaussures femme rouges", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("chaussures femme rouges", "fr")
        .with_match("chaussures femme rouges", "chaussures femme")
        .with_language("bottes femme", "fr")
        .with_match("bottes femme", "chaussures femme");
    let harvester = harvester(platform.clone(), oracle);

    let first = harvester.harvest(ctx(), None).await;
    assert_eq!(first.summary.keywords_labelled, 2);
    assert!(first.ledger.logged("Created label 'Converted_20250610'."));

    // A new converting term shows up before the second run.
    let _ = platform.clone().with_search_term(1, "bottes femme", day(10), 1.0);
    let second = harvester.harvest(ctx(), None).await;

    assert_eq!(second.summary.keywords_created, 2);
    assert_eq!(second.summary.keywords_labelled, 2);
    assert!(!second.ledger.logged("Created label"));
    assert!(second
        .ledger
        .logged("Applying label 'Converted_20250610' to 2 new keywords."));

    let snapshot = platform.snapshot().unwrap();
    assert_eq!(snapshot.labels.len(), 1);
    assert_eq!(platform.keywords_with_label("Converted_20250610").unwrap().len(), 4);
}

#[tokio::test]
async fn test_language_routing_is_exclusive() {
    let platform = MemoryPlatform::new("Acme")
        .with_campaign(1, "Brand-FR-Summer", EntityStatus::Enabled)
        .with_campaign(2, "Brand-Summer", EntityStatus::Enabled)
        .with_ad_group(1, 10, "Shoes", EntityStatus::Enabled)
        .with_ad_group(2, 20, "Shoes", EntityStatus::Enabled)
        .with_search_term(1, "chaussures", day(9), 1.0)
        .with_search_term(2, "sneakers", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("chaussures", "fr")
        .with_language("sneakers", "other")
        .with_default(OracleTask::MatchAdGroup, "shoes");
    let harvester = harvester(platform.clone(), oracle);

    harvester.harvest(ctx(), None).await;

    let french: Vec<_> = platform
        .ad_group_keywords(AdGroupId(10))
        .unwrap()
        .into_iter()
        .map(|k| k.text)
        .collect();
    let other: Vec<_> = platform
        .ad_group_keywords(AdGroupId(20))
        .unwrap()
        .into_iter()
        .map(|k| k.text)
        .collect();
    assert_eq!(french, vec!["[chaussures]", "\"chaussures\""]);
    assert_eq!(other, vec!["[sneakers]", "\"sneakers\""]);
}

#[tokio::test]
async fn test_match_fans_out_to_every_campaign_sharing_the_name() {
    let platform = MemoryPlatform::new("Acme")
        .with_campaign(1, "Brand-DE-Summer", EntityStatus::Enabled)
        .with_campaign(2, "Brand-DE-Winter", EntityStatus::Enabled)
        .with_ad_group(1, 10, "Schuhe", EntityStatus::Enabled)
        .with_ad_group(2, 20, "schuhe ", EntityStatus::Enabled)
        .with_search_term(1, "rote schuhe", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("rote schuhe", "de")
        .with_match("rote schuhe", "schuhe");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    let campaigns: Vec<_> = report
        .ledger
        .rows
        .iter()
        .map(|r| r.campaign_name.as_str())
        .collect();
    assert_eq!(campaigns, vec!["Brand-DE-Summer", "Brand-DE-Winter"]);
    assert_eq!(platform.create_calls(), 4);
}

#[tokio::test]
async fn test_no_campaigns_still_writes_report() {
    let platform = MemoryPlatform::new("Acme").with_campaign(1, "Generic-FR", EntityStatus::Enabled);
    let sink = MemoryReportSink::new();
    let harvester = harvester(platform, MockOracle::new());

    let report = harvester.harvest(ctx(), Some(&sink as &dyn ReportSink)).await;

    assert!(report.ledger.written);
    assert!(harvester.oracle().calls().is_empty());

    let tables = sink.tables();
    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.name, "Acme 2025-06-10 08:00");
    assert_eq!(table.rows[0], REPORT_HEADER.map(String::from).to_vec());
    assert!(table.rows[1].is_empty());
    assert_eq!(table.rows[2], vec![LOG_SECTION_HEADER.to_string()]);
    assert!(table.rows[3][0].ends_with("No enabled campaigns found containing 'Brand'. Run terminated."));
}

#[tokio::test]
async fn test_oracle_requests_use_configured_parameters() {
    let platform = account().with_search_term(2, "red sneakers", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("red sneakers", "other")
        .with_match("red sneakers", "shoes - red");
    let config = HarvestConfig::new("Brand").with_max_output_tokens(12);
    let harvester = Harvester::new(platform, oracle.clone(), config);

    harvester.harvest(ctx(), None).await;

    let calls = oracle.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.temperature == 0.0 && c.max_output_tokens == 12));
    assert_eq!(calls[0].task, OracleTask::ClassifyLanguage);
    assert!(calls[1].user.contains("[shoes - red, shoes - blue]"));
}

#[tokio::test]
async fn test_report_written_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvReportSink::new(dir.path());
    let platform = account().with_search_term(2, "red sneakers", day(9), 1.0);
    let oracle = MockOracle::new()
        .with_language("red sneakers", "other")
        .with_match("red sneakers", "shoes - red");
    let harvester = harvester(platform, oracle);

    let report = harvester.harvest(ctx(), Some(&sink as &dyn ReportSink)).await;

    assert!(report.ledger.written);
    let contents = std::fs::read_to_string(sink.path_for(&report.ledger.table_name)).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("Campaign Name,Ad Group Name,Keywords Added"));
    assert_eq!(
        lines.next(),
        Some("Brand-Summer,Shoes - Red,\"[red sneakers], \"\"red sneakers\"\"\"")
    );
    assert!(contents.contains(LOG_SECTION_HEADER));
}

#[tokio::test]
async fn test_demo_snapshot_run() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/account.json");
    let platform = MemoryPlatform::load(path).unwrap();
    let oracle = MockOracle::new()
        .with_language("chaussures femme rouges", "fr")
        .with_match("chaussures femme rouges", "chaussures femme")
        .with_language("chaussures femme", "fr")
        .with_match("chaussures femme", "chaussures femme")
        .with_language("red running shoes", "other")
        .with_match("red running shoes", "shoes - red");
    let harvester = harvester(platform.clone(), oracle);

    let report = harvester.harvest(ctx(), None).await;

    assert_eq!(report.summary.campaigns, 2);
    assert_eq!(report.summary.terms_seen, 3);
    assert_eq!(report.summary.keywords_created, 4);
    assert_eq!(report.summary.report_rows, 2);
    assert!(report.ledger.table_name.starts_with("Acme Footwear "));
    assert_eq!(platform.keywords_with_label("Converted_20250610").unwrap().len(), 4);
}
