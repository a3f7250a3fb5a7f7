//! # FoodieQ
//!
//! Core engine of a food-ordering storefront: cart, order lifecycle, menu
//! management and realtime reconciliation against a hosted backend.
//!
//! ## Terminology
//!
//! - **Service** (e.g. [`StoreService`]) owns its state and processes one message at a time
//! - **Client** (e.g. [`StoreClient`]) is a cheap, cloneable handle that sends it messages
//!
//! ## Layout
//!
//! - **Foundation**
//!     - **Domain types** → [`MenuItem`], [`CartItem`], [`Order`], [`User`]
//!     - **Cart** → [`Cart`], pure and synchronous
//!     - **Message enums** → [`StoreRequest`], [`TableRequest`]
//! - **Backend**
//!     - **Table actors** stand in for the hosted database, one per table → [`TableActor`]
//!     - **Change events** and idempotent reconciliation → [`ChangeEvent`], [`apply_change`]
//!     - **Gateway** bundles the table clients → [`RemoteGateway`]
//! - **Store**
//!     - **Store service** owns the session, cart and local collections → [`StoreService`]
//!     - **Notifiers** fire once per placed order, best effort → [`OrderNotifier`]
//!     - **Local store** caches collections and the session on disk → [`LocalStore`]
//! - **System**
//!     - **Configuration** from `FOODIEQ_*` environment variables → [`Config`]
//!     - **System coordinator** for startup and shutdown → [`StoreSystem`]
//!     - **Tracing** → [`setup_tracing`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use foodieq::{Config, StoreSystem};
//!
//! let system = StoreSystem::new(&Config::load()?);
//! let store = system.store_client.clone();
//! store.wait_until_loaded().await?;
//!
//! store.login_customer("Aina".into(), "0123456789".into()).await?;
//! store.add_item("m1".into()).await?;
//! let order = store.place_order().await?;
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod cart;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod messages;
pub mod notify;
pub mod queries;
pub mod reconcile;
pub mod storage;
pub mod store_actor;

#[cfg(test)]
mod mock_framework;

pub use actor_framework::{GatewayError, Row, TableActor, TableClient, TableRequest};
pub use app_system::{setup_tracing, StoreSystem};
pub use cart::{Cart, CartError, CartNotice, CartTotals};
pub use clients::{RemoteGateway, StoreClient};
pub use config::Config;
pub use domain::*;
pub use error::{MenuError, OrderError, SessionError};
pub use messages::StoreRequest;
pub use notify::OrderNotifier;
pub use reconcile::{apply_change, ChangeEvent};
pub use storage::LocalStore;
pub use store_actor::{Notice, StoreError, StoreService, Theme};
