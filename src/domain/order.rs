use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::menu::MenuItem;
use crate::error::OrderError;

/// Flat service fee charged once per non-empty order.
pub const SERVICE_FEE: f64 = 2.0;

/// Phone recorded when the customer gave none.
pub const PHONE_NOT_AVAILABLE: &str = "N/A";

/// A menu item snapshot plus a quantity. Price and name are frozen at the time
/// the item entered the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn line_total(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// `pending` moves to `completed` or `cancelled`. Nothing leaves a terminal status.
    pub fn transition(self, to: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.is_terminal() {
            return Err(OrderError::TerminalStatus(self.as_str().to_string()));
        }
        if to == OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(to)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order as stored in the `orders` table. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(deserialize_with = "items_from_array_or_string")]
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub service_fee: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Status-only patch sent to the `orders` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: OrderStatus,
}

impl Order {
    /// Human readable item list, e.g. `Satay (x2), Tea (x1)`.
    pub fn item_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} (x{})", i.item.name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Timestamp-derived order id with a short random suffix so that two orders
/// placed within the same millisecond stay distinct.
pub fn order_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", now.timestamp_millis(), &suffix[..12])
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsColumn {
    List(Vec<CartItem>),
    Encoded(String),
}

// The `items` column arrives either as a JSON array or as a JSON string
// holding that array, depending on how the row was written.
fn items_from_array_or_string<'de, D>(deserializer: D) -> Result<Vec<CartItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match ItemsColumn::deserialize(deserializer)? {
        ItemsColumn::List(items) => Ok(items),
        ItemsColumn::Encoded(raw) => serde_json::from_str(&raw).map_err(serde::de::Error::custom),
    }
}
