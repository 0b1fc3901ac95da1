//! History domain - minimum-price ledger per (game, store) pair

pub mod low_tracker;

pub use low_tracker::HistoricalLowTracker;
