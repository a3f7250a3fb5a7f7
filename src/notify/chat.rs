use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{NotifyError, OrderNotifier};
use crate::domain::Order;

/// Posts a Markdown summary of each placed order to a chat bot channel.
pub struct ChatNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

impl ChatNotifier {
    pub fn new(client: Client, api_base: &str, token: &str, chat_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token),
            chat_id: chat_id.into(),
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl OrderNotifier for ChatNotifier {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let message = SendMessage {
            chat_id: &self.chat_id,
            text: chat_text(order, &self.currency),
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        debug!(status = %response.status(), "Chat endpoint answered");
        Ok(())
    }
}

pub fn chat_text(order: &Order, currency: &str) -> String {
    let items = order
        .items
        .iter()
        .map(|line| format!("- {} (x{})", line.item.name, line.quantity))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🚨 *NEW ORDER*\n🆔 `{}`\n👤 {}\n📞 {}\n\n🛒 *Items:*\n{}\n\n💰 *Total: {} {:.2}*",
        order.id, order.customer_name, order.customer_phone, items, currency, order.total
    )
}
