//! Notification delivery for noteworthy reconciliation results

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use tracing::info;

use crate::domain::watchlist::ReconciliationResult;
use crate::shared::errors::NotifyError;

/// Delivery contract. The reconciliation core hands over results whose
/// classification is non-empty; whether delivery succeeds is irrelevant to
/// the core's own state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, result: &ReconciliationResult) -> Result<(), NotifyError>;
}

/// Render a result as a human-readable message
pub fn format_deal_message(result: &ReconciliationResult) -> String {
    let observation = &result.observation;
    let mut message = format!(
        "🎮 {}\n🏪 Store: {}\n💰 Price: ${:.2}",
        observation.title, observation.store, observation.price
    );

    if observation.original_price > observation.price {
        message.push_str(&format!(
            " (was ${:.2})\n🎯 Discount: {:.1}%",
            observation.original_price, observation.discount_percent
        ));
    }

    if let Some(reason) = &result.classification.reason {
        message.push_str(&format!("\n✨ {}", reason));
    }

    if result.classification.target_met {
        if let Some(target) = result.entry.target_price {
            message.push_str(&format!("\n🎯 Target price reached (${:.2})", target));
        }
    }

    message.push_str(&format!("\n🔗 {}", observation.url));
    message
}

/// Fallback notifier that only writes to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, result: &ReconciliationResult) -> Result<(), NotifyError> {
        info!("\n{}", format_deal_message(result));
        Ok(())
    }
}
