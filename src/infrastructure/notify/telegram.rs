//! Telegram delivery via the Bot API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::domain::watchlist::ReconciliationResult;
use crate::shared::errors::NotifyError;
use crate::shared::types::TelegramConfig;

use super::{format_deal_message, Notifier};

pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, result: &ReconciliationResult) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": format_deal_message(result),
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery(format!(
                "telegram responded with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
