//! Ads platform collaborators: enumeration, keyword mutation and labels.
//!
//! These are infrastructure traits only. Routing, matching and duplicate
//! checks live in the pipeline; implementations just talk to the platform.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ad_group::{AdGroup, AdGroupId, Campaign},
    keyword::{Keyword, KeywordMutationRequest, KeywordRecord, Label},
    term::DateRange,
};

/// Read side of the ads platform.
#[async_trait]
pub trait EnumerationSource: Send + Sync {
    /// Display name of the account, used to name the run report.
    async fn account_name(&self) -> Result<String>;

    /// Enabled campaigns whose name contains `name_contains`, ignoring case.
    async fn enabled_campaigns(&self, name_contains: &str) -> Result<Vec<Campaign>>;

    /// Enabled ad groups of a campaign.
    async fn enabled_ad_groups(&self, campaign: &Campaign) -> Result<Vec<AdGroup>>;

    /// Current keywords of an ad group, all match types.
    async fn keywords(&self, ad_group_id: AdGroupId) -> Result<Vec<Keyword>>;

    /// Search terms of a campaign with no keyword coverage and at least one
    /// conversion inside `range`, raw as the platform reports them.
    async fn converting_search_terms(
        &self,
        campaign: &Campaign,
        range: &DateRange,
    ) -> Result<Vec<String>>;
}

/// Keyword creation. Not idempotent on the platform side.
#[async_trait]
pub trait KeywordSink: Send + Sync {
    /// Create a keyword. Validation failures come back as
    /// [`HarvestError::MutationRejected`](crate::error::HarvestError::MutationRejected).
    async fn create_keyword(&self, request: &KeywordMutationRequest) -> Result<KeywordRecord>;
}

/// Label lookup, creation and assignment.
#[async_trait]
pub trait LabelSink: Send + Sync {
    /// Label with exactly this name, if any.
    async fn find_label(&self, name: &str) -> Result<Option<Label>>;

    async fn create_label(&self, name: &str, description: &str) -> Result<()>;

    async fn apply_label(&self, keyword: &KeywordRecord, label: &Label) -> Result<()>;
}

/// Everything the harvester needs from the platform.
pub trait AdsPlatform: EnumerationSource + KeywordSink + LabelSink {}

impl<T: EnumerationSource + KeywordSink + LabelSink> AdsPlatform for T {}
