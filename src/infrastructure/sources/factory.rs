use std::sync::Arc;

use tracing::info;

use super::cheapshark::CheapSharkAdapter;
use super::itad::ItadAdapter;
use super::traits::SourceAdapter;
use crate::shared::types::SourcesConfig;

/// Factory for creating price-source adapters
pub struct AdapterFactory;

impl AdapterFactory {
    /// Build every adapter the configuration enables. CheapShark needs no
    /// credentials and is always on; ITAD only runs with an API key.
    pub fn create_adapters(config: &SourcesConfig) -> Vec<Arc<dyn SourceAdapter>> {
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(CheapSharkAdapter::new(
            config.cheapshark_api_base.clone(),
        ))];

        match &config.itad_api_key {
            Some(key) if !key.is_empty() => {
                adapters.push(Arc::new(ItadAdapter::new(
                    config.itad_api_base.clone(),
                    key.clone(),
                )));
            }
            _ => info!("no ITAD api key configured, source disabled"),
        }

        adapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itad_requires_api_key() {
        let config = SourcesConfig::default();
        assert_eq!(AdapterFactory::create_adapters(&config).len(), 1);

        let config = SourcesConfig {
            itad_api_key: Some("k".to_string()),
            ..SourcesConfig::default()
        };
        let adapters = AdapterFactory::create_adapters(&config);
        assert_eq!(adapters.len(), 2);
        assert_eq!(adapters[1].name(), "itad");
    }
}
