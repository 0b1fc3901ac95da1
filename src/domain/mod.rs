//! Domain layer - core business logic and entities

pub mod deal;
pub mod history;
pub mod watchlist;
