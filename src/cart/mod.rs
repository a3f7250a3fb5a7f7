//! In-memory cart for the current customer session.
//!
//! Holds at most one line per menu item id. Quantities merge on add and a line
//! disappears as soon as its quantity would drop to zero.

mod error;

pub use error::*;

use tracing::debug;

use crate::domain::{CartItem, MenuItem, SERVICE_FEE};

/// Confirmation shown to the customer after a successful add.
#[derive(Debug, Clone, PartialEq)]
pub enum CartNotice {
    Added { name: String },
    QuantityIncreased { name: String, quantity: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: &MenuItem) -> Result<CartNotice, CartError> {
        if !item.available {
            return Err(CartError::ItemUnavailable(item.id.clone()));
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.id() == item.id) {
            line.quantity = line
                .quantity
                .checked_add(1)
                .ok_or_else(|| CartError::QuantityLimit(item.id.clone()))?;
            debug!(item_id = %item.id, quantity = line.quantity, "Cart quantity increased");
            return Ok(CartNotice::QuantityIncreased {
                name: line.item.name.clone(),
                quantity: line.quantity,
            });
        }

        self.items.push(CartItem { item: item.clone(), quantity: 1 });
        debug!(item_id = %item.id, "Cart line added");
        Ok(CartNotice::Added { name: item.name.clone() })
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|line| line.id() != id);
    }

    /// Applies a signed delta. A result of zero or less drops the line. A
    /// result past the largest quantity is refused and leaves the line as is.
    pub fn update_quantity(&mut self, id: &str, delta: i64) -> Result<(), CartError> {
        let Some(pos) = self.items.iter().position(|line| line.id() == id) else {
            return Ok(());
        };

        let limit = || CartError::QuantityLimit(id.to_string());
        let next = i64::from(self.items[pos].quantity).checked_add(delta).ok_or_else(limit)?;
        if next <= 0 {
            self.items.remove(pos);
        } else {
            self.items[pos].quantity = u32::try_from(next).map_err(|_| limit())?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The fee only applies once there is at least one line.
    pub fn service_fee(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            SERVICE_FEE
        }
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.service_fee()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.item_count(),
            subtotal: self.subtotal(),
            service_fee: self.service_fee(),
            total: self.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of quantities across lines.
    pub item_count: u32,
    pub subtotal: f64,
    pub service_fee: f64,
    pub total: f64,
}
