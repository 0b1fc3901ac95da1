//! Periodic reconciliation runs

use std::time::Duration;

use tracing::{error, info};

use crate::application::services::WatchlistService;
use crate::shared::errors::AppError;

/// Run `check_all` forever on a fixed interval. The first pass starts
/// immediately; a failed pass is logged and the loop keeps going.
pub async fn run_scheduler(service: &WatchlistService, interval: Duration) -> Result<(), AppError> {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        info!("starting scheduled watchlist check");

        match service.check_all().await {
            Ok(results) => {
                let amazing = results.iter().filter(|r| r.classification.amazing_deal).count();
                let targets = results.iter().filter(|r| r.classification.target_met).count();
                info!(
                    observations = results.len(),
                    amazing_deals = amazing,
                    target_hits = targets,
                    "scheduled check finished"
                );
            }
            Err(e) => error!("scheduled check failed: {}", e),
        }
    }
}
