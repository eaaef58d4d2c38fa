//! Duplicate-safe keyword creation.
//!
//! The platform does not deduplicate keyword creation, so the check against
//! the ad group's existing exact and phrase sets is the only idempotence
//! guarantee. The sets are read from the platform once per ad group per run
//! and updated in memory as keywords are created.

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::ledger::RunContext;
use crate::traits::platform::{EnumerationSource, KeywordSink};
use crate::types::{
    ad_group::AdGroupCandidate,
    keyword::{ExistingKeywords, KeywordMutationRequest, MatchType},
    term::SearchTerm,
};

/// Make sure the run inventory holds the ad group's existing keywords.
async fn load_inventory<P: EnumerationSource + ?Sized>(
    platform: &P,
    ctx: &mut RunContext,
    ad_group: &AdGroupCandidate,
) -> bool {
    if ctx.inventory.contains(ad_group.id) {
        return true;
    }
    match platform.keywords(ad_group.id).await {
        Ok(keywords) => {
            ctx.inventory
                .insert(ad_group.id, ExistingKeywords::from_keywords(&keywords));
            true
        }
        Err(e) => {
            ctx.log(format!(
                "ERROR: Could not read existing keywords of Ad Group '{}': {}. Skipping it.",
                ad_group.name, e
            ));
            false
        }
    }
}

/// Add the term to the ad group as exact and phrase match, skipping any
/// variant already present.
///
/// Returns the comma-joined keyword texts actually created; empty when
/// nothing was added.
pub async fn add_keywords<P: EnumerationSource + KeywordSink + ?Sized>(
    platform: &P,
    config: &HarvestConfig,
    ctx: &mut RunContext,
    ad_group: &AdGroupCandidate,
    term: &SearchTerm,
) -> String {
    if !load_inventory(platform, ctx, ad_group).await {
        return String::new();
    }

    let mut added = Vec::new();
    for match_type in MatchType::HARVESTED {
        let present = ctx
            .inventory
            .get(ad_group.id)
            .map(|existing| existing.contains(match_type, term.normalized()))
            .unwrap_or(false);
        if present {
            ctx.log(format!(
                "{} keyword already present in Ad Group '{}': {}",
                match_type.display_name(),
                ad_group.name,
                match_type.keyword_text(term.text())
            ));
            continue;
        }

        let request = KeywordMutationRequest::new(ad_group.id, term.text(), match_type, config.default_bid);
        match platform.create_keyword(&request).await {
            Ok(record) => {
                if let Some(existing) = ctx.inventory.get_mut(ad_group.id) {
                    existing.insert(match_type, term.normalized());
                }
                ctx.log(format!(
                    "Added {} keyword to Ad Group '{}': {}",
                    match_type.display_name(),
                    ad_group.name,
                    request.text
                ));
                added.push(request.text);
                ctx.created.push(record);
            }
            Err(HarvestError::MutationRejected { reasons }) => ctx.log(format!(
                "Failed to add {} keyword to Ad Group '{}': {}",
                match_type.display_name(),
                ad_group.name,
                reasons.join(", ")
            )),
            Err(e) => ctx.log(format!(
                "Failed to add {} keyword to Ad Group '{}': {}",
                match_type.display_name(),
                ad_group.name,
                e
            )),
        }
    }

    added.join(", ")
}
