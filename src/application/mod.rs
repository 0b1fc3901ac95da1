//! Application layer - use cases and services

pub mod commands;
pub mod services;
pub mod scheduler;

pub use commands::{Cli, Commands, CommandExecutor};
pub use services::WatchlistService;
pub use scheduler::run_scheduler;
