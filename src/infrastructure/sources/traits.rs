use async_trait::async_trait;

use crate::shared::errors::AdapterError;
use crate::shared::types::PriceObservation;

/// Trait for storefront/aggregator price sources.
/// This provides a unified interface over heterogeneous deal APIs; the
/// reconciliation loop only ever sees normalized observations.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short source name used in logs
    fn name(&self) -> &str;

    /// Search current deals for a game title
    async fn search(&self, title: &str) -> Result<Vec<PriceObservation>, AdapterError>;
}
