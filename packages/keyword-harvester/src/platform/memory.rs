//! In-memory ads platform, backed by a JSON account snapshot.
//!
//! Used by tests and for dry runs of the binary: load a snapshot, run the
//! harvester against it, optionally write the mutated snapshot back.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{HarvestError, Result};
use crate::traits::platform::{EnumerationSource, KeywordSink, LabelSink};
use crate::types::{
    ad_group::{AdGroup, AdGroupId, Campaign, CampaignId},
    keyword::{Keyword, KeywordId, KeywordMutationRequest, KeywordRecord, Label, MatchType},
    term::DateRange,
};

/// Serving status of a campaign or ad group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityStatus {
    #[default]
    Enabled,
    Paused,
    Removed,
}

/// Whole-account state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account_name: String,
    #[serde(default)]
    pub campaigns: Vec<CampaignSnapshot>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub ad_groups: Vec<AdGroupSnapshot>,
    #[serde(default)]
    pub search_terms: Vec<SearchTermSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdGroupSnapshot {
    pub id: AdGroupId,
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

/// One row of the search-term performance feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTermSnapshot {
    pub query: String,
    pub date: NaiveDate,
    pub conversions: f64,
    /// The query already matches a keyword.
    #[serde(default)]
    pub covered_by_keyword: bool,
}

/// In-memory platform. Clones share state, so a test can keep a handle
/// while the harvester owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    state: Arc<RwLock<AccountSnapshot>>,
    /// Lowercase delimited keyword text -> rejection reasons
    rejections: Arc<RwLock<HashMap<String, Vec<String>>>>,
    create_calls: Arc<AtomicUsize>,
}

impl MemoryPlatform {
    pub fn new(account_name: impl Into<String>) -> Self {
        Self::from_snapshot(AccountSnapshot {
            account_name: account_name.into(),
            ..Default::default()
        })
    }

    pub fn from_snapshot(snapshot: AccountSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
            ..Default::default()
        }
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot: AccountSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the current state as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(&*self.read()?)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<AccountSnapshot> {
        Ok(self.read()?.clone())
    }

    /// Number of `create_keyword` calls received, rejected ones included.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Make the platform reject a keyword text, delimiters included
    /// (`[term]` rejects only the exact variant). Case-insensitive.
    pub fn reject_keyword(&self, text: &str, reasons: &[&str]) -> Result<()> {
        self.rejections
            .write()
            .map_err(|_| poisoned())?
            .insert(
                text.trim().to_lowercase(),
                reasons.iter().map(|r| r.to_string()).collect(),
            );
        Ok(())
    }

    /// Keywords of an ad group.
    pub fn ad_group_keywords(&self, ad_group_id: AdGroupId) -> Result<Vec<Keyword>> {
        let state = self.read()?;
        Ok(find_ad_group(&state, ad_group_id)
            .map(|group| group.keywords.clone())
            .unwrap_or_default())
    }

    /// Every keyword carrying the label, across the account.
    pub fn keywords_with_label(&self, label: &str) -> Result<Vec<Keyword>> {
        let state = self.read()?;
        Ok(state
            .campaigns
            .iter()
            .flat_map(|c| &c.ad_groups)
            .flat_map(|g| &g.keywords)
            .filter(|k| k.labels.iter().any(|l| l == label))
            .cloned()
            .collect())
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_campaign(self, id: i64, name: &str, status: EntityStatus) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.campaigns.push(CampaignSnapshot {
                id: CampaignId(id),
                name: name.to_string(),
                status,
                ad_groups: Vec::new(),
                search_terms: Vec::new(),
            });
        }
        self
    }

    pub fn with_ad_group(self, campaign_id: i64, id: i64, name: &str, status: EntityStatus) -> Self {
        if let Ok(mut state) = self.state.write() {
            if let Some(campaign) = state
                .campaigns
                .iter_mut()
                .find(|c| c.id == CampaignId(campaign_id))
            {
                campaign.ad_groups.push(AdGroupSnapshot {
                    id: AdGroupId(id),
                    name: name.to_string(),
                    status,
                    keywords: Vec::new(),
                });
            }
        }
        self
    }

    pub fn with_keyword(self, ad_group_id: i64, text: &str, match_type: MatchType) -> Self {
        if let Ok(mut state) = self.state.write() {
            let id = next_keyword_id(&state);
            if let Some(group) = find_ad_group_mut(&mut state, AdGroupId(ad_group_id)) {
                group.keywords.push(Keyword {
                    id,
                    text: text.to_string(),
                    match_type,
                    labels: Vec::new(),
                });
            }
        }
        self
    }

    pub fn with_search_term(self, campaign_id: i64, query: &str, date: NaiveDate, conversions: f64) -> Self {
        if let Ok(mut state) = self.state.write() {
            if let Some(campaign) = state
                .campaigns
                .iter_mut()
                .find(|c| c.id == CampaignId(campaign_id))
            {
                campaign.search_terms.push(SearchTermSnapshot {
                    query: query.to_string(),
                    date,
                    conversions,
                    covered_by_keyword: false,
                });
            }
        }
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, AccountSnapshot>> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, AccountSnapshot>> {
        self.state.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> HarvestError {
    HarvestError::Platform("account state lock poisoned".into())
}

fn find_ad_group(state: &AccountSnapshot, id: AdGroupId) -> Option<&AdGroupSnapshot> {
    state
        .campaigns
        .iter()
        .flat_map(|c| &c.ad_groups)
        .find(|g| g.id == id)
}

fn find_ad_group_mut(state: &mut AccountSnapshot, id: AdGroupId) -> Option<&mut AdGroupSnapshot> {
    state
        .campaigns
        .iter_mut()
        .flat_map(|c| c.ad_groups.iter_mut())
        .find(|g| g.id == id)
}

fn next_keyword_id(state: &AccountSnapshot) -> KeywordId {
    let max = state
        .campaigns
        .iter()
        .flat_map(|c| &c.ad_groups)
        .flat_map(|g| &g.keywords)
        .map(|k| k.id.0)
        .max()
        .unwrap_or(0);
    KeywordId(max + 1)
}

#[async_trait]
impl EnumerationSource for MemoryPlatform {
    async fn account_name(&self) -> Result<String> {
        Ok(self.read()?.account_name.clone())
    }

    async fn enabled_campaigns(&self, name_contains: &str) -> Result<Vec<Campaign>> {
        let needle = name_contains.to_lowercase();
        Ok(self
            .read()?
            .campaigns
            .iter()
            .filter(|c| c.status == EntityStatus::Enabled)
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .map(|c| Campaign {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    async fn enabled_ad_groups(&self, campaign: &Campaign) -> Result<Vec<AdGroup>> {
        let state = self.read()?;
        let snapshot = state
            .campaigns
            .iter()
            .find(|c| c.id == campaign.id)
            .ok_or_else(|| HarvestError::Platform(format!("unknown campaign {}", campaign.id.0)))?;
        Ok(snapshot
            .ad_groups
            .iter()
            .filter(|g| g.status == EntityStatus::Enabled)
            .map(|g| AdGroup {
                id: g.id,
                name: g.name.clone(),
                campaign_id: snapshot.id,
                campaign_name: snapshot.name.clone(),
            })
            .collect())
    }

    async fn keywords(&self, ad_group_id: AdGroupId) -> Result<Vec<Keyword>> {
        let state = self.read()?;
        find_ad_group(&state, ad_group_id)
            .map(|g| g.keywords.clone())
            .ok_or_else(|| HarvestError::Platform(format!("unknown ad group {}", ad_group_id.0)))
    }

    async fn converting_search_terms(&self, campaign: &Campaign, range: &DateRange) -> Result<Vec<String>> {
        let state = self.read()?;
        let snapshot = state
            .campaigns
            .iter()
            .find(|c| c.id == campaign.id)
            .ok_or_else(|| HarvestError::Platform(format!("unknown campaign {}", campaign.id.0)))?;
        Ok(snapshot
            .search_terms
            .iter()
            .filter(|t| !t.covered_by_keyword && t.conversions > 0.0 && range.contains(t.date))
            .map(|t| t.query.clone())
            .collect())
    }
}

#[async_trait]
impl KeywordSink for MemoryPlatform {
    async fn create_keyword(&self, request: &KeywordMutationRequest) -> Result<KeywordRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let rejection = self
            .rejections
            .read()
            .map_err(|_| poisoned())?
            .get(&request.text.trim().to_lowercase())
            .cloned();
        if let Some(reasons) = rejection {
            return Err(HarvestError::MutationRejected { reasons });
        }
        if !(request.bid.is_finite() && request.bid > 0.0) {
            return Err(HarvestError::rejected([format!("invalid bid {}", request.bid)]));
        }

        let mut state = self.write()?;
        let id = next_keyword_id(&state);
        let group = find_ad_group_mut(&mut state, request.ad_group_id)
            .ok_or_else(|| HarvestError::rejected([format!("unknown ad group {}", request.ad_group_id.0)]))?;
        group.keywords.push(Keyword {
            id,
            text: request.text.clone(),
            match_type: request.match_type,
            labels: Vec::new(),
        });

        Ok(KeywordRecord {
            id,
            ad_group_id: request.ad_group_id,
            text: request.text.clone(),
            match_type: request.match_type,
        })
    }
}

#[async_trait]
impl LabelSink for MemoryPlatform {
    async fn find_label(&self, name: &str) -> Result<Option<Label>> {
        Ok(self.read()?.labels.iter().find(|l| l.name == name).cloned())
    }

    async fn create_label(&self, name: &str, description: &str) -> Result<()> {
        let mut state = self.write()?;
        if state.labels.iter().any(|l| l.name == name) {
            return Err(HarvestError::Platform(format!("label already exists: {}", name)));
        }
        state.labels.push(Label {
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    async fn apply_label(&self, keyword: &KeywordRecord, label: &Label) -> Result<()> {
        let mut state = self.write()?;
        if !state.labels.iter().any(|l| l.name == label.name) {
            return Err(HarvestError::Platform(format!("unknown label {}", label.name)));
        }
        let group = find_ad_group_mut(&mut state, keyword.ad_group_id)
            .ok_or_else(|| HarvestError::Platform(format!("unknown ad group {}", keyword.ad_group_id.0)))?;
        let entry = group
            .keywords
            .iter_mut()
            .find(|k| k.id == keyword.id)
            .ok_or_else(|| HarvestError::Platform(format!("unknown keyword {}", keyword.id.0)))?;
        if !entry.labels.contains(&label.name) {
            entry.labels.push(label.name.clone());
        }
        Ok(())
    }
}
