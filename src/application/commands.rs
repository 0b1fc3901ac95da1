//! CLI commands and handlers

use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::application::scheduler::run_scheduler;
use crate::application::services::WatchlistService;
use crate::shared::errors::AppError;
use crate::shared::types::AppConfig;

#[derive(Parser)]
#[command(name = "dealhunter")]
#[command(version, about = "Game deal tracker - watchlist reconciliation and deal alerts")]
pub struct Cli {
    /// Path to config file (defaults to Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a game to the watchlist
    Add {
        /// Game title to track
        title: String,

        /// Known external game id
        #[arg(long)]
        game_id: Option<String>,

        /// Notify when the price drops to this value
        #[arg(short, long)]
        target_price: Option<f64>,

        /// Only track deals from this store
        #[arg(short, long)]
        store: Option<String>,
    },

    /// Remove a game from the watchlist
    Remove {
        title: String,

        #[arg(short, long)]
        store: Option<String>,
    },

    /// List tracked games
    List,

    /// Check all tracked games once
    Check,

    /// Run periodic checks until interrupted
    Watch {
        /// Hours between checks (overrides config)
        #[arg(short, long)]
        interval_hours: Option<u64>,
    },

    /// Show recorded amazing deals
    Deals {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

pub struct CommandExecutor {
    service: WatchlistService,
    config: AppConfig,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let service = WatchlistService::new(&config)?;
        Ok(Self { service, config })
    }

    pub async fn execute(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Add {
                title,
                game_id,
                target_price,
                store,
            } => {
                self.service.add_game(&title, game_id, target_price, store)?;
                println!("✅ Added '{}' to the watchlist", title);
            }

            Commands::Remove { title, store } => {
                if self.service.remove_game(&title, store.as_deref())? {
                    println!("✅ Removed '{}' from the watchlist", title);
                } else {
                    println!("'{}' was not on the watchlist", title);
                }
            }

            Commands::List => {
                let games = self.service.games()?;
                if games.is_empty() {
                    println!("The watchlist is empty");
                    return Ok(());
                }
                println!("🎮 Watchlist ({} games):", games.len());
                for entry in games {
                    let target = entry
                        .target_price
                        .map(|t| format!(" (target ${:.2})", t))
                        .unwrap_or_default();
                    let store = entry
                        .store
                        .as_deref()
                        .map(|s| format!(" [{}]", s))
                        .unwrap_or_default();
                    let checked = entry
                        .last_checked
                        .map(|at| format!(" - last checked {}", at.format("%Y-%m-%d %H:%M")))
                        .unwrap_or_else(|| " - never checked".to_string());
                    println!("  {}{}{}{}", entry.game_title, store, target, checked);
                }
            }

            Commands::Check => {
                println!("🔍 Checking the watchlist...");
                let results = self.service.check_all().await?;
                let noteworthy: Vec<_> = results
                    .iter()
                    .filter(|r| r.classification.is_noteworthy())
                    .collect();

                println!(
                    "📊 {} observations, {} worth a look",
                    results.len(),
                    noteworthy.len()
                );
                for result in noteworthy {
                    let flags = match (
                        result.classification.amazing_deal,
                        result.classification.target_met,
                    ) {
                        (true, true) => "🔥🎯",
                        (true, false) => "🔥",
                        _ => "🎯",
                    };
                    println!(
                        "  {} {} at {} - ${:.2} ({})",
                        flags,
                        result.observation.title,
                        result.observation.store,
                        result.observation.price,
                        result.classification.reason.as_deref().unwrap_or("target price met")
                    );
                }
            }

            Commands::Watch { interval_hours } => {
                let hours = interval_hours.unwrap_or(self.config.check_interval_hours).max(1);
                println!("⏰ Checking every {} hour(s), Ctrl+C to stop", hours);
                run_scheduler(&self.service, Duration::from_secs(hours * 3600)).await?;
            }

            Commands::Deals { limit } => {
                let deals = self.service.amazing_deals(limit)?;
                if deals.is_empty() {
                    println!("No amazing deals recorded yet");
                    return Ok(());
                }
                println!("🔥 Amazing deals ({}):", deals.len());
                for deal in deals {
                    println!(
                        "  {} at {} - ${:.2} ({:.1}% off): {}",
                        deal.observation.title,
                        deal.observation.store,
                        deal.observation.price,
                        deal.observation.discount_percent,
                        deal.reason
                    );
                }
            }
        }

        Ok(())
    }
}
