//! Application services and use cases

use std::sync::Arc;
use std::time::Duration;

use crate::domain::history::HistoricalLowTracker;
use crate::domain::watchlist::{Reconciler, ReconcilerConfig, ReconciliationResult};
use crate::infrastructure::notify::{LogNotifier, Notifier, TelegramNotifier};
use crate::infrastructure::sources::AdapterFactory;
use crate::infrastructure::storage::{DealStore, SqliteDealStore};
use crate::shared::errors::AppError;
use crate::shared::types::{AmazingDealRecord, AppConfig, WatchlistEntry};

/// Application service wiring storage, sources, the low tracker, the
/// reconciler, and notification delivery together
pub struct WatchlistService {
    store: Arc<dyn DealStore>,
    reconciler: Reconciler,
}

impl WatchlistService {
    /// Create the service with its SQLite store
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn DealStore> = Arc::new(SqliteDealStore::open(&config.database_path)?);
        Self::with_store(config, store)
    }

    /// Create the service on top of an existing store
    pub fn with_store(config: &AppConfig, store: Arc<dyn DealStore>) -> Result<Self, AppError> {
        config.validate()?;

        let tracker = Arc::new(HistoricalLowTracker::new(Arc::clone(&store)));
        let adapters = AdapterFactory::create_adapters(&config.sources);
        let notifier: Arc<dyn Notifier> = match &config.telegram {
            Some(telegram) => Arc::new(TelegramNotifier::new(telegram)),
            None => Arc::new(LogNotifier),
        };

        let reconciler = Reconciler::new(
            Arc::clone(&store),
            tracker,
            adapters,
            notifier,
            ReconcilerConfig {
                thresholds: config.thresholds.clone(),
                fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
                max_concurrent_entries: config.max_concurrent_entries,
            },
        );

        Ok(Self { store, reconciler })
    }

    /// Add a game to the watchlist (or reactivate/update an existing entry)
    pub fn add_game(
        &self,
        title: &str,
        game_id: Option<String>,
        target_price: Option<f64>,
        store: Option<String>,
    ) -> Result<(), AppError> {
        let entry = WatchlistEntry::new(title, game_id, target_price, store);
        self.store.upsert_watchlist_entry(&entry)?;
        Ok(())
    }

    /// Soft-delete a game. Returns false when nothing matched.
    pub fn remove_game(&self, title: &str, store: Option<&str>) -> Result<bool, AppError> {
        Ok(self.store.deactivate_watchlist_entry(title, store)?)
    }

    /// Active watchlist entries
    pub fn games(&self) -> Result<Vec<WatchlistEntry>, AppError> {
        Ok(self.store.list_watchlist(true)?)
    }

    /// Run one reconciliation pass over the whole watchlist
    pub async fn check_all(&self) -> Result<Vec<ReconciliationResult>, AppError> {
        self.reconciler.reconcile_all().await
    }

    /// Recorded amazing deals, newest first
    pub fn amazing_deals(&self, limit: usize) -> Result<Vec<AmazingDealRecord>, AppError> {
        Ok(self.store.list_amazing_deals(limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> WatchlistService {
        let store: Arc<dyn DealStore> = Arc::new(SqliteDealStore::open_in_memory().unwrap());
        WatchlistService::with_store(&AppConfig::default(), store).unwrap()
    }

    #[test]
    fn test_add_list_remove() {
        let service = service();
        service.add_game("Game X", None, Some(15.0), None).unwrap();
        service.add_game("Game Y", None, None, Some("Steam".to_string())).unwrap();

        let games = service.games().unwrap();
        assert_eq!(games.len(), 2);

        assert!(service.remove_game("Game X", None).unwrap());
        assert!(!service.remove_game("Game X", None).unwrap());
        assert_eq!(service.games().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = AppConfig::default();
        config.fetch_timeout_ms = 0;
        let store: Arc<dyn DealStore> = Arc::new(SqliteDealStore::open_in_memory().unwrap());
        assert!(matches!(
            WatchlistService::with_store(&config, store),
            Err(AppError::ConfigError(_))
        ));
    }
}
