//! Candidate ad-group resolution for a language decision.

use crate::config::HarvestConfig;
use crate::ledger::RunContext;
use crate::traits::platform::EnumerationSource;
use crate::types::{ad_group::CandidateSet, language::Language};

fn language_scope(language: Language) -> String {
    match language {
        Language::Other => "'other' language campaigns".to_string(),
        specific => format!("language: {}", specific),
    }
}

/// Collect the enabled ad groups eligible for `language`, grouped by
/// normalized name in first-seen order.
///
/// An empty set is a normal outcome (logged, the term is skipped). Platform
/// failures are logged and also yield an empty set.
pub async fn resolve_candidates<S: EnumerationSource + ?Sized>(
    source: &S,
    config: &HarvestConfig,
    ctx: &mut RunContext,
    language: Language,
) -> CandidateSet {
    let scope = language_scope(language);

    let campaigns = match source.enabled_campaigns(&config.campaign_name_filter).await {
        Ok(campaigns) => campaigns,
        Err(e) => {
            ctx.log(format!("ERROR: Could not list campaigns for {}: {}", scope, e));
            return CandidateSet::new();
        }
    };

    let eligible: Vec<_> = campaigns
        .into_iter()
        .filter(|c| config.is_eligible(&c.name, language))
        .collect();
    if eligible.is_empty() {
        ctx.log(format!("No eligible campaigns found for {}.", scope));
        return CandidateSet::new();
    }

    let mut candidates = CandidateSet::new();
    for campaign in &eligible {
        match source.enabled_ad_groups(campaign).await {
            Ok(groups) => {
                for group in groups {
                    candidates.push(group.into());
                }
            }
            Err(e) => ctx.log(format!(
                "ERROR: Could not list ad groups of campaign '{}': {}",
                campaign.name, e
            )),
        }
    }

    if candidates.is_empty() {
        ctx.log(format!("No enabled ad groups found for {}.", scope));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{EntityStatus, MemoryPlatform};
    use chrono::NaiveDate;

    fn ctx() -> RunContext {
        RunContext::new(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap())
    }

    fn platform() -> MemoryPlatform {
        MemoryPlatform::new("Acme")
            .with_campaign(1, "Brand-FR-Summer", EntityStatus::Enabled)
            .with_campaign(2, "Brand-Summer", EntityStatus::Enabled)
            .with_campaign(3, "Brand-FR-Winter", EntityStatus::Enabled)
            .with_campaign(4, "Generic-FR", EntityStatus::Enabled)
            .with_ad_group(1, 10, "Chaussures Homme", EntityStatus::Enabled)
            .with_ad_group(1, 11, "Chaussures Femme", EntityStatus::Enabled)
            .with_ad_group(3, 30, " chaussures homme", EntityStatus::Enabled)
            .with_ad_group(3, 31, "Bottes", EntityStatus::Paused)
            .with_ad_group(2, 20, "Shoes - Red", EntityStatus::Enabled)
            .with_ad_group(4, 40, "Sabots", EntityStatus::Enabled)
    }

    #[tokio::test]
    async fn test_language_candidates_fan_out_by_name() {
        let config = HarvestConfig::new("Brand");
        let set = resolve_candidates(&platform(), &config, &mut ctx(), Language::Fr).await;

        assert_eq!(set.ordered_names(), vec!["chaussures homme", "chaussures femme"]);
        let homme: Vec<_> = set.candidates("chaussures homme").iter().map(|c| c.id.0).collect();
        assert_eq!(homme, vec![10, 30]);
    }

    #[tokio::test]
    async fn test_other_excludes_language_campaigns() {
        let config = HarvestConfig::new("Brand");
        let set = resolve_candidates(&platform(), &config, &mut ctx(), Language::Other).await;

        assert_eq!(set.ordered_names(), vec!["shoes - red"]);
        assert_eq!(set.candidates("shoes - red")[0].campaign_name, "Brand-Summer");
    }

    #[tokio::test]
    async fn test_no_eligible_campaign_is_logged() {
        let config = HarvestConfig::new("Brand");
        let mut ctx = ctx();
        let set = resolve_candidates(&platform(), &config, &mut ctx, Language::Zh).await;

        assert!(set.is_empty());
        assert!(ctx.ledger.lines()[0].contains("No eligible campaigns found for language: zh"));
    }

    #[tokio::test]
    async fn test_no_enabled_ad_groups_is_logged() {
        let platform = MemoryPlatform::new("Acme")
            .with_campaign(1, "Brand-DE", EntityStatus::Enabled)
            .with_ad_group(1, 10, "Schuhe", EntityStatus::Paused);
        let mut ctx = ctx();

        let set = resolve_candidates(&platform, &HarvestConfig::new("Brand"), &mut ctx, Language::De).await;

        assert!(set.is_empty());
        assert!(ctx.ledger.lines()[0].contains("No enabled ad groups found for language: de"));
    }
}
