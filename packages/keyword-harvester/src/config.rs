//! Run configuration and the campaign naming convention.

use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::error::{HarvestError, Result};
use crate::types::language::Language;

/// Longest accepted lookback window, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Accepted oracle sampling temperatures.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Static configuration for one harvesting run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Substring every managed campaign name contains (case-insensitive).
    /// Also the account-scope marker for language routing.
    pub campaign_name_filter: String,

    /// Days back to look for converting search terms.
    pub lookback_days: u32,

    /// CPC bid for newly created keywords.
    pub default_bid: f64,

    /// Oracle model name.
    pub model: String,

    /// Oracle sampling temperature. 0 keeps decoding deterministic.
    pub temperature: f32,

    /// Oracle output token budget.
    pub max_output_tokens: u32,

    /// How campaign names encode language.
    pub routing: CampaignRouting,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            campaign_name_filter: String::new(),
            lookback_days: 7,
            default_bid: 1.0,
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_output_tokens: 30,
            routing: CampaignRouting::default(),
        }
    }
}

impl HarvestConfig {
    pub fn new(campaign_name_filter: impl Into<String>) -> Self {
        Self {
            campaign_name_filter: campaign_name_filter.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_filter(None)
    }

    /// Like [`HarvestConfig::from_env`], with the campaign filter supplied by
    /// the caller when `filter` is set.
    pub fn from_env_with_filter(filter: Option<String>) -> Result<Self> {
        let _ = dotenv();

        let campaign_name_filter = match filter {
            Some(filter) => filter,
            None => env::var("HARVEST_CAMPAIGN_FILTER")
                .map_err(|_| HarvestError::Config("HARVEST_CAMPAIGN_FILTER must be set".into()))?,
        };

        let mut config = Self::new(campaign_name_filter);
        if let Some(days) = parse_env("HARVEST_LOOKBACK_DAYS")? {
            config.lookback_days = days;
        }
        if let Some(bid) = parse_env("HARVEST_DEFAULT_BID")? {
            config.default_bid = bid;
        }
        if let Ok(model) = env::var("HARVEST_MODEL") {
            config.model = model;
        }
        if let Some(temperature) = parse_env("HARVEST_TEMPERATURE")? {
            config.temperature = temperature;
        }
        if let Some(tokens) = parse_env("HARVEST_MAX_OUTPUT_TOKENS")? {
            config.max_output_tokens = tokens;
        }
        if let Ok(markers) = env::var("HARVEST_LANGUAGE_MARKERS") {
            config.routing = CampaignRouting::parse(&markers)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.campaign_name_filter.trim().is_empty() {
            return Err(HarvestError::Config(
                "campaign name filter must not be empty".into(),
            ));
        }
        if !(self.default_bid.is_finite() && self.default_bid > 0.0) {
            return Err(HarvestError::Config(format!(
                "default bid must be positive, got {}",
                self.default_bid
            )));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(HarvestError::Config(format!(
                "lookback days must be at most {}, got {}",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(HarvestError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_default_bid(mut self, bid: f64) -> Self {
        self.default_bid = bid;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_routing(mut self, routing: CampaignRouting) -> Self {
        self.routing = routing;
        self
    }

    /// Campaign eligibility for a language under this run's scope marker.
    pub fn is_eligible(&self, campaign_name: &str, language: Language) -> bool {
        self.routing
            .is_eligible(&self.campaign_name_filter, campaign_name, language)
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HarvestError::Config(format!("{} has an invalid value: {}", key, value))),
        Err(_) => Ok(None),
    }
}

/// Naming convention: campaign names encode the language they serve.
///
/// Matching is a case-insensitive substring test, which is deliberately
/// coarse. A language-`other` campaign is one that carries none of the
/// language markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRouting {
    markers: HashMap<Language, String>,
}

impl Default for CampaignRouting {
    /// Each language's marker is its own code.
    fn default() -> Self {
        Self {
            markers: Language::SPECIFIC
                .iter()
                .map(|lang| (*lang, lang.code().to_string()))
                .collect(),
        }
    }
}

impl CampaignRouting {
    /// Routing with explicit markers. Languages left out never match.
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = (Language, S)>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .filter(|(lang, _)| lang.is_specific())
                .map(|(lang, marker)| (lang, Into::<String>::into(marker).to_lowercase()))
                .filter(|(_, marker)| !marker.is_empty())
                .collect(),
        }
    }

    /// Parse `fr=fr,de=ger`; languages not listed keep their default marker.
    pub fn parse(markers: &str) -> Result<Self> {
        let mut routing = Self::default();
        for pair in markers.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (code, marker) = pair
                .split_once('=')
                .ok_or_else(|| HarvestError::Config(format!("invalid language marker: {}", pair)))?;
            let language = Language::parse(code)
                .filter(|l| l.is_specific())
                .ok_or_else(|| HarvestError::Config(format!("unknown language code: {}", code)))?;
            let marker = marker.trim().to_lowercase();
            if marker.is_empty() {
                return Err(HarvestError::Config(format!("empty marker for {}", code)));
            }
            routing.markers.insert(language, marker);
        }
        Ok(routing)
    }

    pub fn marker(&self, language: Language) -> Option<&str> {
        self.markers.get(&language).map(String::as_str)
    }

    pub fn is_eligible(&self, scope_marker: &str, campaign_name: &str, language: Language) -> bool {
        let name = campaign_name.to_lowercase();
        if !name.contains(&scope_marker.to_lowercase()) {
            return false;
        }
        match language {
            Language::Other => !self.markers.values().any(|marker| name.contains(marker.as_str())),
            specific => self
                .marker(specific)
                .map(|marker| name.contains(marker))
                .unwrap_or(false),
        }
    }
}
