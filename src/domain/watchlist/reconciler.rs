//! Watchlist reconciliation loop

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::deal::{classify, merge_observations, DealClassification};
use crate::domain::history::HistoricalLowTracker;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::sources::SourceAdapter;
use crate::infrastructure::storage::DealStore;
use crate::shared::errors::{AppError, DealError, HistoryError};
use crate::shared::types::{
    AmazingDealRecord, DealThresholds, GameIdentity, PriceObservation, WatchlistEntry,
};

/// One observation evaluated against one watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub entry: WatchlistEntry,
    pub observation: PriceObservation,
    pub classification: DealClassification,
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub thresholds: DealThresholds,
    /// Upper bound on a single adapter fetch
    pub fetch_timeout: Duration,
    /// How many entries may reconcile concurrently
    pub max_concurrent_entries: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            thresholds: DealThresholds::default(),
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_entries: 4,
        }
    }
}

/// Drives one reconciliation pass over the watchlist: fetch observations
/// per entry, fold them into the historical-low ledger, classify, persist,
/// and emit results.
///
/// Entries reconcile concurrently up to the configured bound; within one
/// entry observations are processed sequentially so history-append order
/// stays deterministic. A failing entry never aborts the run.
pub struct Reconciler {
    store: Arc<dyn DealStore>,
    tracker: Arc<HistoricalLowTracker>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    notifier: Arc<dyn Notifier>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn DealStore>,
        tracker: Arc<HistoricalLowTracker>,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        notifier: Arc<dyn Notifier>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            store,
            tracker,
            adapters,
            notifier,
            config,
        }
    }

    /// Reconcile every active watchlist entry once
    pub async fn reconcile_all(&self) -> Result<Vec<ReconciliationResult>, AppError> {
        let entries = self.store.list_watchlist(true)?;
        info!(entries = entries.len(), "reconciling watchlist");

        let per_entry: Vec<Vec<ReconciliationResult>> = stream::iter(entries)
            .map(|entry| self.reconcile_one(entry))
            .buffer_unordered(self.config.max_concurrent_entries.max(1))
            .collect()
            .await;

        Ok(per_entry.into_iter().flatten().collect())
    }

    /// Reconcile a single entry. Adapter failures degrade to zero
    /// observations; `last_checked` is stamped exactly once regardless.
    pub async fn reconcile_one(&self, entry: WatchlistEntry) -> Vec<ReconciliationResult> {
        let observations = self.fetch_observations(&entry).await;
        let mut results = Vec::with_capacity(observations.len());

        for observation in observations {
            match self.evaluate(&entry, observation).await {
                Ok(result) => {
                    if result.classification.is_noteworthy() {
                        if let Err(e) = self.notifier.notify(&result).await {
                            warn!(game = %entry.game_title, "notification delivery failed: {}", e);
                        }
                    }
                    results.push(result);
                }
                Err(e) => {
                    warn!(game = %entry.game_title, "observation skipped: {}", e);
                }
            }
        }

        if let Err(e) =
            self.store
                .touch_last_checked(&entry.game_title, entry.store.as_deref(), Utc::now())
        {
            warn!(game = %entry.game_title, "failed to update last_checked: {}", e);
        }

        results
    }

    /// Fetch from every adapter under the configured timeout, merge
    /// duplicates, and apply the entry's store filter.
    async fn fetch_observations(&self, entry: &WatchlistEntry) -> Vec<PriceObservation> {
        let mut all = Vec::new();

        for adapter in &self.adapters {
            match tokio::time::timeout(self.config.fetch_timeout, adapter.search(&entry.game_title))
                .await
            {
                Ok(Ok(observations)) => all.extend(observations),
                Ok(Err(e)) => {
                    warn!(
                        source = adapter.name(),
                        game = %entry.game_title,
                        "fetch failed, treating as zero observations: {}",
                        e
                    );
                }
                Err(_) => {
                    warn!(
                        source = adapter.name(),
                        game = %entry.game_title,
                        "fetch timed out after {:?}",
                        self.config.fetch_timeout
                    );
                }
            }
        }

        let mut merged = merge_observations(all);

        if let Some(filter) = &entry.store {
            let needle = filter.to_lowercase();
            merged.retain(|observation| observation.store.to_lowercase().contains(&needle));
        }

        debug!(game = %entry.game_title, observations = merged.len(), "observations after merge");
        merged
    }

    /// Evaluate one observation: fold it into the low ledger, classify it
    /// against the low as it stood before this sighting, and persist.
    /// Storage failures on the persistence steps are logged and the
    /// classification is still returned.
    async fn evaluate(
        &self,
        entry: &WatchlistEntry,
        observation: PriceObservation,
    ) -> Result<ReconciliationResult, DealError> {
        let identity = GameIdentity::from_parts(entry.game_id.as_deref(), &observation.title);

        let prior_low = match self.tracker.get(&identity, Some(&observation.store)).await {
            Ok(low) => low,
            Err(e) => {
                warn!(game = %identity, "could not read historical low: {}", e);
                None
            }
        };

        match self
            .tracker
            .record(&identity, &observation.store, observation.price, observation.observed_at)
            .await
        {
            Ok(true) => {
                debug!(game = %identity, store = %observation.store, price = observation.price, "recorded new low");
            }
            Ok(false) => {}
            Err(HistoryError::InvalidPrice(price)) => return Err(DealError::InvalidPrice(price)),
            Err(HistoryError::Storage(e)) => {
                warn!(game = %identity, "could not record historical low: {}", e);
            }
        }

        let classification = classify(
            &observation,
            prior_low.as_ref(),
            entry.target_price,
            &self.config.thresholds,
        )?;

        if let Err(e) = self.store.append_price_history(&observation, &identity) {
            warn!(game = %identity, "failed to append price history: {}", e);
        }

        if classification.amazing_deal {
            let record = AmazingDealRecord {
                id: None,
                observation: observation.clone(),
                reason: classification
                    .reason
                    .clone()
                    .unwrap_or_else(|| "Amazing deal".to_string()),
                notified: false,
            };
            if let Err(e) = self.store.save_amazing_deal(&record) {
                warn!(game = %identity, "failed to save amazing deal: {}", e);
            }
        }

        Ok(ReconciliationResult {
            entry: entry.clone(),
            observation,
            classification,
        })
    }
}
