//! Campaigns, ad groups and the candidate set a term can be routed to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Platform identifier of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub i64);

/// Platform identifier of an ad group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdGroupId(pub i64);

/// An enabled campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
}

/// An enabled ad group, tagged with its owning campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdGroup {
    pub id: AdGroupId,
    pub name: String,
    pub campaign_id: CampaignId,
    pub campaign_name: String,
}

/// Normalized grouping key for ad-group names: trimmed, lowercase.
pub fn normalize_group_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An ad group eligible to receive a term.
///
/// Its existing keywords live in the run's
/// [`KeywordInventory`](crate::ledger::KeywordInventory), shared by every
/// candidate set the ad group appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdGroupCandidate {
    pub id: AdGroupId,
    pub name: String,
    pub normalized_name: String,
    pub campaign_id: CampaignId,
    pub campaign_name: String,
}

impl From<AdGroup> for AdGroupCandidate {
    fn from(group: AdGroup) -> Self {
        Self {
            normalized_name: normalize_group_name(&group.name),
            id: group.id,
            name: group.name,
            campaign_id: group.campaign_id,
            campaign_name: group.campaign_name,
        }
    }
}

/// Candidate ad groups grouped by normalized name, in first-seen order.
///
/// A name appears once even when several campaigns own an ad group with
/// that name; matching a name fans out to all of them.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    groups: IndexMap<String, Vec<AdGroupCandidate>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: AdGroupCandidate) {
        self.groups
            .entry(candidate.normalized_name.clone())
            .or_default()
            .push(candidate);
    }

    /// Distinct normalized names in first-seen order.
    pub fn ordered_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Every ad group sharing the normalized name.
    pub fn candidates(&self, normalized_name: &str) -> &[AdGroupCandidate] {
        self.groups
            .get(normalized_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

impl FromIterator<AdGroupCandidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = AdGroupCandidate>>(iter: I) -> Self {
        let mut set = Self::new();
        for candidate in iter {
            set.push(candidate);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: i64, name: &str, campaign: &str) -> AdGroupCandidate {
        AdGroup {
            id: AdGroupId(id),
            name: name.to_string(),
            campaign_id: CampaignId(id * 100),
            campaign_name: campaign.to_string(),
        }
        .into()
    }

    #[test]
    fn test_names_are_unique_and_ordered() {
        let set: CandidateSet = vec![
            group(1, "Shoes - Red", "Brand-A"),
            group(2, "shoes - blue", "Brand-A"),
            group(3, "  SHOES - RED ", "Brand-B"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.ordered_names(), vec!["shoes - red", "shoes - blue"]);
        assert_eq!(set.candidates("shoes - red").len(), 2);
        assert_eq!(set.candidates("shoes - blue").len(), 1);
        assert!(set.candidates("missing").is_empty());
    }
}
