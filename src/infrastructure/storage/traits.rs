use chrono::{DateTime, Utc};

use crate::shared::errors::StorageError;
use crate::shared::types::{
    AmazingDealRecord, GameIdentity, HistoricalLow, PriceObservation, WatchlistEntry,
};

/// Persistence contract required by the reconciliation core.
///
/// Every operation is safe to retry: appending the same
/// (game, store, timestamp) history row twice is ignored, not duplicated,
/// and upserts overwrite rather than accumulate.
pub trait DealStore: Send + Sync {
    /// Append one observation to the price history of a game
    fn append_price_history(
        &self,
        observation: &PriceObservation,
        identity: &GameIdentity,
    ) -> Result<(), StorageError>;

    /// Most recent history rows for a game, newest first
    fn get_price_history(
        &self,
        identity: &GameIdentity,
        store: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PriceObservation>, StorageError>;

    /// Recorded low for a (game, store) pair. Without a store this returns
    /// the global minimum across stores, most recently recorded on ties.
    fn get_history_low(
        &self,
        identity: &GameIdentity,
        store: Option<&str>,
    ) -> Result<Option<HistoricalLow>, StorageError>;

    /// Insert or overwrite the low for a (game, store) pair
    fn upsert_history_low(
        &self,
        identity: &GameIdentity,
        store: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    fn save_amazing_deal(&self, record: &AmazingDealRecord) -> Result<(), StorageError>;

    /// Recorded amazing deals, newest first
    fn list_amazing_deals(&self, limit: usize) -> Result<Vec<AmazingDealRecord>, StorageError>;

    /// Flip the notified flag once the notifier collaborator delivered
    fn mark_deal_notified(&self, id: i64) -> Result<(), StorageError>;

    fn list_watchlist(&self, active_only: bool) -> Result<Vec<WatchlistEntry>, StorageError>;

    /// Insert or replace an entry; re-adding a removed game reactivates it
    fn upsert_watchlist_entry(&self, entry: &WatchlistEntry) -> Result<(), StorageError>;

    /// Soft delete. Returns false when nothing matched.
    fn deactivate_watchlist_entry(
        &self,
        title: &str,
        store: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// Stamp the last reconciliation time on an active entry
    fn touch_last_checked(
        &self,
        title: &str,
        store: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}
