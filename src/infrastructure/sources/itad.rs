//! IsThereAnyDeal adapter. Requires an API key; without one the factory
//! never constructs it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::shared::errors::AdapterError;
use crate::shared::types::PriceObservation;

use super::traits::SourceAdapter;

#[derive(Debug, Default, Deserialize)]
struct ItadSearchResponse {
    #[serde(rename = ".meta", default)]
    meta: ItadSearchMeta,
    #[serde(rename = ".data", default)]
    data: ItadSearchData,
}

#[derive(Debug, Default, Deserialize)]
struct ItadSearchMeta {
    #[serde(rename = "match", default)]
    match_kind: String,
}

#[derive(Debug, Default, Deserialize)]
struct ItadSearchData {
    #[serde(default)]
    list: Vec<ItadGameRef>,
}

#[derive(Debug, Deserialize)]
struct ItadGameRef {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ItadPricesResponse {
    #[serde(rename = ".data", default)]
    data: HashMap<String, ItadGamePrices>,
}

#[derive(Debug, Default, Deserialize)]
struct ItadGamePrices {
    #[serde(default)]
    title: String,
    #[serde(default)]
    list: Vec<ItadStorePrice>,
}

#[derive(Debug, Deserialize)]
struct ItadStorePrice {
    #[serde(default)]
    price_new: f64,
    #[serde(default)]
    price_old: f64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    shop: ItadShop,
}

#[derive(Debug, Default, Deserialize)]
struct ItadShop {
    #[serde(default)]
    name: String,
}

pub struct ItadAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ItadAdapter {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    async fn search_game_ids(&self, title: &str) -> Result<Vec<String>, AdapterError> {
        let url = format!("{}/search/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", title), ("limit", "20")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdapterError::UnexpectedResponse(
                self.name().to_string(),
                format!("status {}", response.status()),
            ));
        }

        let body: ItadSearchResponse = response.json().await?;
        if body.meta.match_kind != "found" {
            return Ok(Vec::new());
        }

        Ok(body
            .data
            .list
            .into_iter()
            .map(|game| game.id)
            .filter(|id| !id.is_empty())
            .collect())
    }

    async fn current_prices(&self, game_id: &str) -> Result<Vec<PriceObservation>, AdapterError> {
        let url = format!("{}/game/prices", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("plains", game_id),
                ("region", "us"),
                ("country", "US"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdapterError::UnexpectedResponse(
                self.name().to_string(),
                format!("status {}", response.status()),
            ));
        }

        let body: ItadPricesResponse = response.json().await?;
        let Some(game) = body.data.get(game_id) else {
            return Ok(Vec::new());
        };

        let title = if game.title.is_empty() {
            "Unknown"
        } else {
            &game.title
        };

        Ok(game
            .list
            .iter()
            .map(|store| {
                PriceObservation::new(
                    title,
                    store.shop.name.as_str(),
                    store.price_new,
                    store.price_old,
                    0.0,
                    store.id.as_str(),
                    store.url.as_str(),
                    Utc::now(),
                )
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for ItadAdapter {
    fn name(&self) -> &str {
        "itad"
    }

    async fn search(&self, title: &str) -> Result<Vec<PriceObservation>, AdapterError> {
        let game_ids = self.search_game_ids(title).await?;
        debug!(count = game_ids.len(), "itad games matched");

        let mut observations = Vec::new();
        for game_id in game_ids {
            observations.extend(self.current_prices(&game_id).await?);
        }
        Ok(observations)
    }
}
