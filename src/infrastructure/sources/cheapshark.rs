//! CheapShark deal aggregator adapter

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::shared::errors::AdapterError;
use crate::shared::types::PriceObservation;

use super::traits::SourceAdapter;

/// One deal in a CheapShark `/deals` response. The API serializes every
/// number as a string.
#[derive(Debug, Deserialize)]
struct CheapSharkDeal {
    #[serde(default)]
    title: String,
    #[serde(rename = "storeID", default)]
    store_id: String,
    #[serde(rename = "salePrice", default)]
    sale_price: String,
    #[serde(rename = "normalPrice", default)]
    normal_price: String,
    #[serde(default)]
    savings: String,
    #[serde(rename = "dealID", default)]
    deal_id: String,
}

pub struct CheapSharkAdapter {
    client: Client,
    base_url: String,
}

impl CheapSharkAdapter {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl SourceAdapter for CheapSharkAdapter {
    fn name(&self) -> &str {
        "cheapshark"
    }

    async fn search(&self, title: &str) -> Result<Vec<PriceObservation>, AdapterError> {
        let url = format!("{}/deals", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AdapterError::UnexpectedResponse(
                self.name().to_string(),
                format!("status {}", response.status()),
            ));
        }

        let deals: Vec<CheapSharkDeal> = response.json().await?;
        debug!(count = deals.len(), "cheapshark deals fetched");

        let needle = title.to_lowercase();
        let observations = deals
            .into_iter()
            .filter(|deal| deal.title.to_lowercase().contains(&needle))
            .map(|deal| {
                let url = format!(
                    "https://www.cheapshark.com/redirect?dealID={}",
                    deal.deal_id
                );
                PriceObservation::new(
                    deal.title,
                    deal.store_id,
                    deal.sale_price.parse().unwrap_or(0.0),
                    deal.normal_price.parse().unwrap_or(0.0),
                    deal.savings.parse().unwrap_or(0.0),
                    deal.deal_id,
                    url,
                    Utc::now(),
                )
            })
            .collect();

        Ok(observations)
    }
}
