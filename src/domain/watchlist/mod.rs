//! Watchlist domain - reconciling tracked entries against fresh observations

pub mod reconciler;

pub use reconciler::{Reconciler, ReconcilerConfig, ReconciliationResult};
