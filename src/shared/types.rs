//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::errors::AppError;
use crate::shared::utils::derive_discount_percent;

/// A single price sighting for a game at a store at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub title: String,
    pub store: String,
    pub price: f64,
    pub original_price: f64,
    pub discount_percent: f64,
    pub source_id: String,
    pub url: String,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Create an observation, deriving the discount from the original price
    /// when one is known. Source-provided discounts are only trusted when the
    /// original price is missing.
    pub fn new(
        title: impl Into<String>,
        store: impl Into<String>,
        price: f64,
        original_price: f64,
        source_discount_percent: f64,
        source_id: impl Into<String>,
        url: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let discount_percent = if original_price > 0.0 {
            derive_discount_percent(original_price, price)
        } else {
            source_discount_percent.clamp(0.0, 100.0)
        };

        Self {
            title: title.into(),
            store: store.into(),
            price,
            original_price,
            discount_percent,
            source_id: source_id.into(),
            url: url.into(),
            observed_at,
        }
    }
}

/// Normalized key that resolves observations from different sources to the
/// same logical game: an explicit external game id when one is known,
/// otherwise the lowercased title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameIdentity(String);

impl GameIdentity {
    pub fn from_parts(game_id: Option<&str>, title: &str) -> Self {
        match game_id {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self(title.to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowest price ever observed for a (game, store) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalLow {
    pub lowest_price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A user's intent to track one game, optionally pinned to a store and a
/// target price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub game_title: String,
    pub game_id: Option<String>,
    pub target_price: Option<f64>,
    pub store: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_checked: Option<DateTime<Utc>>,
}

impl WatchlistEntry {
    pub fn new(
        game_title: impl Into<String>,
        game_id: Option<String>,
        target_price: Option<f64>,
        store: Option<String>,
    ) -> Self {
        Self {
            game_title: game_title.into(),
            game_id,
            target_price,
            store,
            active: true,
            created_at: Utc::now(),
            last_checked: None,
        }
    }
}

/// Persisted record of an observation that classified as an amazing deal.
/// The `notified` flag is flipped by the notification collaborator, never
/// by the reconciliation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmazingDealRecord {
    pub id: Option<i64>,
    pub observation: PriceObservation,
    pub reason: String,
    pub notified: bool,
}

/// Thresholds that drive deal classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DealThresholds {
    /// Minimum discount for the deep-discount rule (%)
    pub min_discount_percent: f64,
    /// Tolerance for the near-historical-low rule (%)
    pub price_tolerance_percent: f64,
    /// Price ceiling for the no-history fallback rule ($)
    pub fallback_price_ceiling: f64,
    /// Minimum discount for the no-history fallback rule (%)
    pub fallback_min_discount: f64,
}

impl Default for DealThresholds {
    fn default() -> Self {
        Self {
            min_discount_percent: 75.0,
            price_tolerance_percent: 5.0,
            fallback_price_ceiling: 5.0,
            fallback_min_discount: 50.0,
        }
    }
}

/// Price-source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub cheapshark_api_base: String,
    pub itad_api_base: String,
    pub itad_api_key: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            cheapshark_api_base: "https://www.cheapshark.com/api/1.0".to_string(),
            itad_api_base: "https://api.isthereanydeal.com/v01".to_string(),
            itad_api_key: None,
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub thresholds: DealThresholds,
    pub sources: SourcesConfig,
    pub telegram: Option<TelegramConfig>,
    /// Upper bound on a single adapter fetch
    pub fetch_timeout_ms: u64,
    /// How many watchlist entries may reconcile at once
    pub max_concurrent_entries: usize,
    /// Interval between scheduled checks
    pub check_interval_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "data/game_deals.db".to_string(),
            thresholds: DealThresholds::default(),
            sources: SourcesConfig::default(),
            telegram: None,
            fetch_timeout_ms: 30000,
            max_concurrent_entries: 4,
            check_interval_hours: 6,
        }
    }
}

impl AppConfig {
    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=100.0).contains(&self.thresholds.min_discount_percent) {
            return Err(AppError::ConfigError(format!(
                "min_discount_percent must be within 0..=100, got {}",
                self.thresholds.min_discount_percent
            )));
        }
        if self.thresholds.price_tolerance_percent < 0.0 {
            return Err(AppError::ConfigError(format!(
                "price_tolerance_percent must be non-negative, got {}",
                self.thresholds.price_tolerance_percent
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(AppError::ConfigError(
                "fetch_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_entries == 0 {
            return Err(AppError::ConfigError(
                "max_concurrent_entries must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
