//! Deal domain - classification and aggregation of price observations

pub mod classifier;
pub mod dedup;

pub use classifier::{classify, DealClassification};
pub use dedup::merge_observations;
