//! Best-effort outbound notifications for placed orders.
//!
//! Each notifier runs in its own spawned task with its own error handler. A
//! failure is logged and dropped: it is never retried and never reaches the
//! customer, and it cannot affect the order that triggered it.

mod chat;
mod sheet;

pub use chat::*;
pub use sheet::*;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::Order;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Spawns one detached task per notifier and returns immediately.
pub fn dispatch_all(notifiers: &[Arc<dyn OrderNotifier>], order: &Order) {
    for notifier in notifiers {
        let notifier = Arc::clone(notifier);
        let order = order.clone();
        let span = info_span!("notify", notifier = notifier.name(), order_id = %order.id);

        tokio::spawn(
            async move {
                match notifier.notify(&order).await {
                    Ok(()) => info!("Notification delivered"),
                    Err(e) => warn!(error = %e, "Notification failed, dropping"),
                }
            }
            .instrument(span),
        );
    }
}
