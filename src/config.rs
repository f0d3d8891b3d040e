//! # Configuration
//!
//! [`CatalogConfig`] gathers the knobs the catalog reads at startup. Defaults
//! suit local development; [`CatalogConfig::from_env`] overrides them from
//! `CATALOG_*` environment variables.
//!
//! | Variable | Example |
//! |----------|---------|
//! | `CATALOG_TOPIC` | `/topic/inventory` |
//! | `CATALOG_LOW_STOCK_THRESHOLD` | `5` |
//! | `CATALOG_DISCOUNT_TIERS` | `50:10,100:20` (min stock : percent off) |
//! | `CATALOG_STRATEGY` | `best-deals` |
//! | `CATALOG_MAX_RECOMMENDATIONS` | `8` |
//! | `CATALOG_LOG_FORMAT` | `compact` or `json` |
//!
//! Log levels come from `RUST_LOG`, see [`setup_tracing`](crate::lifecycle::setup_tracing).

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

use crate::pricing::DiscountTier;
use crate::recommend::RankingStrategy;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `compact` or `json`, got `{other}`")),
        }
    }
}

/// Deserialized documents use camelCase keys throughout, nested tiers included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Topic every change is published on.
    pub topic: String,
    /// Mailbox size of the product actor. Zero is treated as one.
    pub channel_capacity: usize,
    /// Per-subscriber backlog of the broadcast publisher.
    pub broadcast_capacity: usize,
    /// Stock strictly below this is badged "Low Stock".
    pub low_stock_threshold: u32,
    /// Overstock discounts. Empty means current price tracks base price.
    pub discount_tiers: Vec<DiscountTier>,
    pub initial_strategy: RankingStrategy,
    pub max_recommendations: usize,
    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            topic: "/topic/inventory".to_string(),
            channel_capacity: 32,
            broadcast_capacity: 256,
            low_stock_threshold: 5,
            discount_tiers: Vec::new(),
            initial_strategy: RankingStrategy::CollaborativeFiltering,
            max_recommendations: 8,
            log_format: LogFormat::Compact,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys keep their
    /// defaults; present but malformed keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(topic) = lookup("CATALOG_TOPIC") {
            config.topic = topic;
        }
        if let Some(raw) = lookup("CATALOG_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = parse("CATALOG_LOW_STOCK_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_DISCOUNT_TIERS") {
            config.discount_tiers = parse_tiers(&raw)?;
        }
        if let Some(raw) = lookup("CATALOG_STRATEGY") {
            config.initial_strategy = parse("CATALOG_STRATEGY", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_MAX_RECOMMENDATIONS") {
            config.max_recommendations = parse("CATALOG_MAX_RECOMMENDATIONS", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_LOG_FORMAT") {
            config.log_format = parse("CATALOG_LOG_FORMAT", &raw)?;
        }
        Ok(config)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// Parses `min_stock:percent_off` pairs separated by commas.
fn parse_tiers(raw: &str) -> Result<Vec<DiscountTier>, ConfigError> {
    const KEY: &str = "CATALOG_DISCOUNT_TIERS";
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (min, pct) = pair.split_once(':').ok_or_else(|| ConfigError::Invalid {
                key: KEY,
                reason: format!("expected `min:percent`, got `{pair}`"),
            })?;
            let percent_off: Decimal = parse(KEY, pct)?;
            if percent_off < Decimal::ZERO || percent_off > Decimal::ONE_HUNDRED {
                return Err(ConfigError::Invalid {
                    key: KEY,
                    reason: format!("percent must be within 0..=100, got {percent_off}"),
                });
            }
            Ok(DiscountTier {
                min_stock: parse(KEY, min)?,
                percent_off,
            })
        })
        .collect()
}
