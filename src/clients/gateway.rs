use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::actor_framework::{GatewayError, TableClient};
use crate::domain::{MenuItem, Order, OrderPatch, OrderStatus};
use crate::impl_table_methods;
use crate::reconcile::ChangeEvent;

/// Handle on the hosted backend, the system of record. One table client per table.
#[derive(Clone)]
pub struct RemoteGateway {
    menu: TableClient<MenuItem>,
    orders: TableClient<Order>,
}

impl RemoteGateway {
    pub fn new(menu: TableClient<MenuItem>, orders: TableClient<Order>) -> Self {
        Self { menu, orders }
    }

    pub fn subscribe_menu(&self) -> broadcast::Receiver<ChangeEvent<MenuItem>> {
        self.menu.subscribe()
    }

    pub fn subscribe_orders(&self) -> broadcast::Receiver<ChangeEvent<Order>> {
        self.orders.subscribe()
    }

    #[instrument(fields(item_id = %item.id), skip(self, item))]
    pub async fn upsert_menu_item(&self, item: MenuItem) -> Result<(), GatewayError> {
        debug!("Sending request");
        self.menu.upsert(item).await
    }

    #[instrument(fields(count = items.len()), skip(self, items))]
    pub async fn insert_menu_items(&self, items: Vec<MenuItem>) -> Result<(), GatewayError> {
        debug!("Sending request");
        self.menu.insert(items).await
    }

    #[instrument(fields(order_id = %order.id), skip(self, order))]
    pub async fn insert_order(&self, order: Order) -> Result<(), GatewayError> {
        debug!("Sending request");
        self.orders.insert(vec![order]).await
    }

    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: String, status: OrderStatus) -> Result<Order, GatewayError> {
        debug!("Sending request");
        self.orders.update(id, OrderPatch { status }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.menu.shutdown().await;
        let _ = self.orders.shutdown().await;
    }
}

impl_table_methods!(RemoteGateway, menu, MenuItem, menu_item, menu_items);
impl_table_methods!(RemoteGateway, orders, Order, order, orders);
