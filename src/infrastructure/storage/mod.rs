//! Persistent storage for price history, lows, deals, and the watchlist

pub mod traits;
pub mod sqlite;

pub use traits::DealStore;
pub use sqlite::SqliteDealStore;
