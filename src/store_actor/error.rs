use thiserror::Error;

use crate::actor_framework::GatewayError;
use crate::cart::CartError;
use crate::error::{MenuError, OrderError, SessionError};

/// Everything a store request can fail with.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Menu(#[from] MenuError),
    #[error("Persistence failure: {0}")]
    Persistence(#[from] GatewayError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
