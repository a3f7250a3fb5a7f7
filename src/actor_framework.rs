//! Generic table actor backing the hosted `menu_items` and `orders` tables.
//!
//! Each table is one [`TableActor`] owning its rows in insertion order. Every
//! committed mutation is published on a broadcast channel before the writer is
//! answered, which is what the store subscribes to for realtime sync.

use std::fmt::Debug;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::domain::{MenuItem, Order, OrderPatch};
use crate::reconcile::ChangeEvent;

// =============================================================================
// 1. ROWS
// =============================================================================

/// A record that lives in a hosted table, keyed by a string id.
pub trait Row: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Partial update accepted by `update`.
    type Patch: Clone + Debug + Send + Sync;

    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn on_update(&mut self, patch: Self::Patch);
}

impl Row for MenuItem {
    type Patch = MenuItem;

    const TABLE: &'static str = "menu_items";

    fn id(&self) -> &str {
        &self.id
    }

    fn on_update(&mut self, patch: MenuItem) {
        let id = std::mem::take(&mut self.id);
        *self = MenuItem { id, ..patch };
    }
}

impl Row for Order {
    type Patch = OrderPatch;

    const TABLE: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }

    fn on_update(&mut self, patch: OrderPatch) {
        self.status = patch.status;
    }
}

// =============================================================================
// 2. MESSAGES
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Row not found in {table}: {id}")]
    NotFound { table: &'static str, id: String },
    #[error("Duplicate id in {table}: {id}")]
    Conflict { table: &'static str, id: String },
    #[error("Table unavailable: {0}")]
    Unavailable(String),
}

pub type Response<T> = oneshot::Sender<Result<T, GatewayError>>;

#[derive(Debug)]
pub enum TableRequest<T: Row> {
    Select {
        respond_to: Response<Vec<T>>,
    },
    /// All-or-nothing: a duplicate id anywhere rejects the batch.
    Insert {
        rows: Vec<T>,
        respond_to: Response<()>,
    },
    Upsert {
        row: T,
        respond_to: Response<()>,
    },
    Update {
        id: String,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE ACTOR
// =============================================================================

pub struct TableActor<T: Row> {
    receiver: mpsc::Receiver<TableRequest<T>>,
    rows: Vec<T>,
    events: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Row> TableActor<T> {
    pub fn new(buffer_size: usize) -> (Self, TableClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (events, _) = broadcast::channel(buffer_size.max(16));
        let actor = Self {
            receiver,
            rows: Vec::new(),
            events: events.clone(),
        };
        (actor, TableClient::new(sender, events))
    }

    #[instrument(name = "table_actor", fields(table = T::TABLE), skip(self))]
    pub async fn run(mut self) {
        info!("Table starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TableRequest::Select { respond_to } => {
                    let _ = respond_to.send(Ok(self.rows.clone()));
                }
                TableRequest::Insert { rows, respond_to } => {
                    let _ = respond_to.send(self.handle_insert(rows));
                }
                TableRequest::Upsert { row, respond_to } => {
                    self.handle_upsert(row);
                    let _ = respond_to.send(Ok(()));
                }
                TableRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                TableRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                TableRequest::Shutdown => {
                    info!("Table shutting down");
                    break;
                }
            }
        }

        info!("Table stopped");
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id() == id)
    }

    fn publish(&self, event: ChangeEvent<T>) {
        // No subscribers is fine; nobody is listening yet.
        if self.events.send(event).is_err() {
            debug!("No realtime subscribers");
        }
    }

    #[instrument(fields(count = rows.len()), skip(self, rows))]
    fn handle_insert(&mut self, rows: Vec<T>) -> Result<(), GatewayError> {
        for (i, row) in rows.iter().enumerate() {
            let duplicate_in_batch = rows[..i].iter().any(|r| r.id() == row.id());
            if duplicate_in_batch || self.position(row.id()).is_some() {
                warn!(id = %row.id(), "Insert rejected: duplicate id");
                return Err(GatewayError::Conflict { table: T::TABLE, id: row.id().to_string() });
            }
        }

        for row in rows {
            self.rows.push(row.clone());
            self.publish(ChangeEvent::Insert(row));
        }
        debug!(row_count = self.rows.len(), "Rows inserted");
        Ok(())
    }

    #[instrument(fields(id = %row.id()), skip(self, row))]
    fn handle_upsert(&mut self, row: T) {
        match self.position(row.id()) {
            Some(pos) => {
                self.rows[pos] = row.clone();
                self.publish(ChangeEvent::Update(row));
            }
            None => {
                self.rows.push(row.clone());
                self.publish(ChangeEvent::Insert(row));
            }
        }
    }

    #[instrument(skip(self, patch))]
    fn handle_update(&mut self, id: String, patch: T::Patch) -> Result<T, GatewayError> {
        let pos = self
            .position(&id)
            .ok_or(GatewayError::NotFound { table: T::TABLE, id })?;
        self.rows[pos].on_update(patch);
        let row = self.rows[pos].clone();
        self.publish(ChangeEvent::Update(row.clone()));
        Ok(row)
    }

    #[instrument(skip(self))]
    fn handle_delete(&mut self, id: String) -> Result<(), GatewayError> {
        let pos = self
            .position(&id)
            .ok_or_else(|| GatewayError::NotFound { table: T::TABLE, id: id.clone() })?;
        self.rows.remove(pos);
        self.publish(ChangeEvent::Delete { id });
        Ok(())
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

#[derive(Clone)]
pub struct TableClient<T: Row> {
    sender: mpsc::Sender<TableRequest<T>>,
    events: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Row> TableClient<T> {
    pub fn new(sender: mpsc::Sender<TableRequest<T>>, events: broadcast::Sender<ChangeEvent<T>>) -> Self {
        Self { sender, events }
    }

    /// Subscribes to every mutation committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.events.subscribe()
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> TableRequest<T>,
    ) -> Result<R, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| GatewayError::Unavailable("Table closed".to_string()))?;
        response
            .await
            .map_err(|_| GatewayError::Unavailable("Table dropped".to_string()))?
    }

    pub async fn select(&self) -> Result<Vec<T>, GatewayError> {
        self.request(|respond_to| TableRequest::Select { respond_to }).await
    }

    pub async fn insert(&self, rows: Vec<T>) -> Result<(), GatewayError> {
        self.request(|respond_to| TableRequest::Insert { rows, respond_to }).await
    }

    pub async fn upsert(&self, row: T) -> Result<(), GatewayError> {
        self.request(|respond_to| TableRequest::Upsert { row, respond_to }).await
    }

    pub async fn update(&self, id: String, patch: T::Patch) -> Result<T, GatewayError> {
        self.request(|respond_to| TableRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: String) -> Result<(), GatewayError> {
        self.request(|respond_to| TableRequest::Delete { id, respond_to }).await
    }

    pub async fn shutdown(&self) -> Result<(), GatewayError> {
        self.sender
            .send(TableRequest::Shutdown)
            .await
            .map_err(|_| GatewayError::Unavailable("Table closed".to_string()))
    }
}
