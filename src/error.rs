use thiserror::Error;

/// Errors that can occur during order lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order is already {0}")]
    TerminalStatus(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,
    #[error("Customer name and phone are required")]
    MissingCustomerDetails,
    #[error("Admin role required")]
    NotAuthorized,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Invalid price for {id}: {price}")]
    InvalidPrice { id: String, price: f64 },
}
