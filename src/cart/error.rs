use thiserror::Error;

/// Errors that can occur while editing the cart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Item unavailable: {0}")]
    ItemUnavailable(String),
    #[error("Unknown menu item: {0}")]
    UnknownItem(String),
    #[error("Quantity limit reached for {0}")]
    QuantityLimit(String),
}
