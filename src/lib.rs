//! Dealhunter - game price tracking and deal evaluation
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::WatchlistService;
pub use domain::deal::{classify, merge_observations, DealClassification};
pub use domain::history::HistoricalLowTracker;
pub use domain::watchlist::{Reconciler, ReconciliationResult};
pub use infrastructure::notify::Notifier;
pub use infrastructure::sources::SourceAdapter;
pub use infrastructure::storage::{DealStore, SqliteDealStore};
