use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use tracing::debug;

use super::{NotifyError, OrderNotifier};
use crate::domain::Order;

/// Appends each placed order to a spreadsheet through a form-encoded webhook.
/// The endpoint answers opaquely, so the response is never inspected.
pub struct SheetNotifier {
    client: Client,
    url: String,
    offset: FixedOffset,
}

impl SheetNotifier {
    pub fn new(client: Client, url: impl Into<String>, offset: FixedOffset) -> Self {
        Self { client, url: url.into(), offset }
    }
}

#[async_trait]
impl OrderNotifier for SheetNotifier {
    fn name(&self) -> &'static str {
        "sheet"
    }

    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .form(&sheet_form(order, self.offset))
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        debug!(status = %response.status(), "Sheet webhook answered");
        Ok(())
    }
}

pub fn format_order_date(created_at: DateTime<Utc>, offset: FixedOffset) -> String {
    created_at.with_timezone(&offset).format("%d/%m/%Y, %H:%M:%S").to_string()
}

pub fn sheet_form(order: &Order, offset: FixedOffset) -> Vec<(&'static str, String)> {
    vec![
        ("order_id", order.id.clone()),
        ("date", format_order_date(order.created_at, offset)),
        ("customer_name", order.customer_name.clone()),
        ("customer_phone", order.customer_phone.clone()),
        ("items", order.item_summary()),
        ("total", format!("{:.2}", order.total)),
        ("status", order.status.to_string()),
    ]
}
