use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::infrastructure::storage::DealStore;
use crate::shared::errors::HistoryError;
use crate::shared::types::{GameIdentity, HistoricalLow};

/// Per (game, store) minimum-price ledger.
///
/// Lows only ever move down and are never deleted. All writes go through
/// `record`, which holds a per-key lock across its read-check-write cycle:
/// two concurrent entries referencing the same game cannot apply a stale
/// comparison and drop a genuine new low. Distinct keys never block each
/// other.
pub struct HistoricalLowTracker {
    store: Arc<dyn DealStore>,
    key_locks: Mutex<HashMap<(GameIdentity, String), Arc<Mutex<()>>>>,
}

impl HistoricalLowTracker {
    pub fn new(store: Arc<dyn DealStore>) -> Self {
        Self {
            store,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, identity: &GameIdentity, store_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry((identity.clone(), store_key.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a price sighting. Returns true only when this price is
    /// strictly lower than anything recorded before for the pair (or the
    /// pair is new). A matching price refreshes `recorded_at` but keeps the
    /// low; a higher price is a no-op. Never fails on a higher price.
    pub async fn record(
        &self,
        identity: &GameIdentity,
        store_name: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<bool, HistoryError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(HistoryError::InvalidPrice(price));
        }

        let store_key = store_name.to_lowercase();
        let key_lock = self.lock_for(identity, &store_key).await;
        let _guard = key_lock.lock().await;

        let current = self.store.get_history_low(identity, Some(&store_key))?;
        match current {
            None => {
                self.store.upsert_history_low(identity, &store_key, price, at)?;
                debug!(game = %identity, store = %store_key, price, "first historical low");
                Ok(true)
            }
            Some(low) if price < low.lowest_price => {
                self.store.upsert_history_low(identity, &store_key, price, at)?;
                debug!(
                    game = %identity,
                    store = %store_key,
                    price,
                    previous = low.lowest_price,
                    "new historical low"
                );
                Ok(true)
            }
            Some(low) if price == low.lowest_price => {
                // Same low seen again: refresh the timestamp only
                self.store.upsert_history_low(identity, &store_key, price, at)?;
                Ok(false)
            }
            Some(_) => Ok(false),
        }
    }

    /// Recorded low for a pair, or the global minimum across stores when no
    /// store is given (ties broken by most recent recording).
    pub async fn get(
        &self,
        identity: &GameIdentity,
        store_name: Option<&str>,
    ) -> Result<Option<HistoricalLow>, HistoryError> {
        let store_key = store_name.map(|s| s.to_lowercase());
        Ok(self.store.get_history_low(identity, store_key.as_deref())?)
    }
}
