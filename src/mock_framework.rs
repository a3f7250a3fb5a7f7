//! # Mock Framework
//!
//! Utilities for testing the store service against a scripted backend.
//!
//! Use [`create_mock_table`] to get a table client and the receiving end of
//! its mailbox. Then use helpers like [`expect_select`] or [`expect_insert`]
//! to assert each request and answer it however the test needs, including
//! with failures a real table would never produce on demand.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::actor_framework::{Response, Row, TableClient, TableRequest};
use crate::clients::RemoteGateway;
use crate::domain::{MenuItem, Order};
use crate::notify::{NotifyError, OrderNotifier};
use crate::reconcile::ChangeEvent;

/// The test's side of a mocked table.
pub struct MockTable<T: Row> {
    pub requests: mpsc::Receiver<TableRequest<T>>,
    /// Publishing here looks like a realtime event to subscribers.
    pub events: broadcast::Sender<ChangeEvent<T>>,
}

pub fn create_mock_table<T: Row>(buffer_size: usize) -> (TableClient<T>, MockTable<T>) {
    let (sender, requests) = mpsc::channel(buffer_size);
    let (events, _) = broadcast::channel(16);
    (TableClient::new(sender, events.clone()), MockTable { requests, events })
}

pub fn create_mock_gateway() -> (RemoteGateway, MockTable<MenuItem>, MockTable<Order>) {
    let (menu, menu_mock) = create_mock_table(10);
    let (orders, order_mock) = create_mock_table(10);
    (RemoteGateway::new(menu, orders), menu_mock, order_mock)
}

/// Helper to verify that the next message is a Select request
pub async fn expect_select<T: Row>(mock: &mut MockTable<T>) -> Option<Response<Vec<T>>> {
    match mock.requests.recv().await {
        Some(TableRequest::Select { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Insert request
pub async fn expect_insert<T: Row>(mock: &mut MockTable<T>) -> Option<(Vec<T>, Response<()>)> {
    match mock.requests.recv().await {
        Some(TableRequest::Insert { rows, respond_to }) => Some((rows, respond_to)),
        _ => None,
    }
}

pub async fn expect_upsert<T: Row>(mock: &mut MockTable<T>) -> Option<(T, Response<()>)> {
    match mock.requests.recv().await {
        Some(TableRequest::Upsert { row, respond_to }) => Some((row, respond_to)),
        _ => None,
    }
}

pub async fn expect_update<T: Row>(mock: &mut MockTable<T>) -> Option<(String, T::Patch, Response<T>)> {
    match mock.requests.recv().await {
        Some(TableRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

pub async fn expect_delete<T: Row>(mock: &mut MockTable<T>) -> Option<(String, Response<()>)> {
    match mock.requests.recv().await {
        Some(TableRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Notifier that reports every order it is handed.
pub struct RecordingNotifier(mpsc::UnboundedSender<Order>);

impl RecordingNotifier {
    pub fn create() -> (Arc<dyn OrderNotifier>, mpsc::UnboundedReceiver<Order>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self(tx)), rx)
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let _ = self.0.send(order.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::GatewayError;
    use crate::domain::{default_menu, OrderStatus};
    use crate::storage::LocalStore;
    use crate::error::{MenuError, OrderError};
    use crate::store_actor::{Notice, StoreError, StoreService};
    use chrono::Utc;
    use std::time::Duration;

    fn pending_order(id: &str) -> Order {
        Order {
            id: id.into(),
            customer_name: "Aina".into(),
            customer_phone: "0123".into(),
            items: Vec::new(),
            subtotal: 10.0,
            service_fee: 2.0,
            total: 12.0,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Answers the two initial selects with the given rows.
    async fn answer_initial_load(
        menu: &mut MockTable<MenuItem>,
        orders: &mut MockTable<Order>,
        menu_rows: Vec<MenuItem>,
        order_rows: Vec<Order>,
    ) {
        expect_select(menu).await.expect("Expected menu Select").send(Ok(menu_rows)).unwrap();
        expect_select(orders).await.expect("Expected orders Select").send(Ok(order_rows)).unwrap();
    }

    #[tokio::test]
    async fn test_mock_table() {
        let (client, mut mock) = create_mock_table::<Order>(10);
        let mut events = client.subscribe();

        let insert_task = tokio::spawn(async move { client.insert(vec![pending_order("ORD-1")]).await });

        let (rows, responder) = expect_insert(&mut mock).await.expect("Expected Insert request");
        assert_eq!(rows[0].id, "ORD-1");
        responder.send(Ok(())).unwrap();
        assert_eq!(insert_task.await.unwrap(), Ok(()));

        mock.events.send(ChangeEvent::Delete { id: "ORD-1".into() }).unwrap();
        assert_eq!(events.recv().await.unwrap(), ChangeEvent::Delete { id: "ORD-1".into() });
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_cart_and_skips_notifiers() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (notifier, mut notified) = RecordingNotifier::create();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), vec![notifier]);
        let mut notices = store.subscribe_notices();
        tokio::spawn(service.with_order_ids(|_| "ORD-FIXED".to_string()).run());

        answer_initial_load(&mut menu, &mut orders, default_menu(), Vec::new()).await;
        store.login_customer("Aina".into(), "0123".into()).await.unwrap();
        store.add_item("m1".into()).await.unwrap();

        let placing = store.clone();
        let place_task = tokio::spawn(async move { placing.place_order().await });

        let (rows, responder) = expect_insert(&mut orders).await.expect("Expected Insert request");
        assert_eq!(rows[0].id, "ORD-FIXED");
        assert_eq!(rows[0].total, 14.0);
        responder.send(Err(GatewayError::Unavailable("offline".into()))).unwrap();

        let result = place_task.await.unwrap();
        assert!(matches!(result, Err(StoreError::Persistence(GatewayError::Unavailable(_)))));
        assert_eq!(store.get_cart().await.unwrap().len(), 1);
        assert!(store.list_orders().await.unwrap().is_empty());
        assert!(matches!(notices.recv().await.unwrap(), Notice::SyncFailed { .. }));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(notified.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_initial_load_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        local.save_menu_items(&default_menu()).unwrap();

        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, local, Vec::new());
        let mut notices = store.subscribe_notices();
        tokio::spawn(service.run());
        assert!(store.is_loading());

        expect_select(&mut menu).await.unwrap().send(Err(GatewayError::Unavailable("offline".into()))).unwrap();
        expect_select(&mut orders).await.unwrap().send(Ok(Vec::new())).unwrap();

        store.wait_until_loaded().await.unwrap();
        assert_eq!(store.list_menu_items().await.unwrap().len(), 6);
        assert!(matches!(notices.recv().await.unwrap(), Notice::SyncFailed { .. }));
    }

    #[tokio::test]
    async fn test_failed_status_update_leaves_local_order_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, Vec::new(), vec![pending_order("ORD-1")]).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        let updating = store.clone();
        let update_task =
            tokio::spawn(async move { updating.update_order_status("ORD-1".into(), OrderStatus::Completed).await });

        let (id, patch, responder) = expect_update(&mut orders).await.expect("Expected Update request");
        assert_eq!(id, "ORD-1");
        assert_eq!(patch.status, OrderStatus::Completed);
        responder.send(Err(GatewayError::Unavailable("timeout".into()))).unwrap();

        assert!(update_task.await.unwrap().is_err());
        assert_eq!(store.list_orders().await.unwrap()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_order_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, Vec::new(), Vec::new()).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        let result = store.update_order_status("ORD-404".into(), OrderStatus::Completed).await;
        assert_eq!(result, Err(StoreError::Order(OrderError::NotFound("ORD-404".into()))));
        assert!(orders.requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_menu_delete_tolerates_missing_remote_row() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, default_menu(), Vec::new()).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        let deleting = store.clone();
        let delete_task = tokio::spawn(async move { deleting.delete_menu_item("m6".into()).await });

        let (id, responder) = expect_delete(&mut menu).await.expect("Expected Delete request");
        assert_eq!(id, "m6");
        responder.send(Err(GatewayError::NotFound { table: "menu_items", id })).unwrap();

        assert_eq!(delete_task.await.unwrap(), Ok(()));
        assert_eq!(store.list_menu_items().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_save_menu_item_sends_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, default_menu(), Vec::new()).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        let mut item = default_menu().remove(0);
        item.price = 13.5;
        let saving = store.clone();
        let save_task = tokio::spawn(async move { saving.save_menu_item(item).await });

        let (row, responder) = expect_upsert(&mut menu).await.expect("Expected Upsert request");
        assert_eq!(row.price, 13.5);
        responder.send(Ok(())).unwrap();
        assert_eq!(save_task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_lagged_subscription_refetches_table() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, Vec::new(), Vec::new()).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        // Hold the service inside a request while the subscription overflows.
        let saved = MenuItem::new("x", "Kopi", "Drinks", 3.0);
        let saving = store.clone();
        let save_task = tokio::spawn({
            let saved = saved.clone();
            async move { saving.save_menu_item(saved).await }
        });
        let (_, responder) = expect_upsert(&mut menu).await.expect("Expected Upsert request");

        let burst: Vec<MenuItem> = (0..20).map(|i| MenuItem::new(format!("e{i}"), "Extra", "Main", 1.0)).collect();
        for item in &burst {
            menu.events.send(ChangeEvent::Insert(item.clone())).unwrap();
        }
        responder.send(Ok(())).unwrap();
        assert_eq!(save_task.await.unwrap(), Ok(()));

        let mut refetched = vec![saved];
        refetched.extend(burst);
        expect_select(&mut menu)
            .await
            .expect("Expected re-fetch Select")
            .send(Ok(refetched.clone()))
            .unwrap();

        assert_eq!(store.list_menu_items().await.unwrap(), refetched);
    }

    #[tokio::test]
    async fn test_invalid_price_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, mut menu, mut orders) = create_mock_gateway();
        let (service, store) = StoreService::new(10, gateway, LocalStore::new(dir.path()), Vec::new());
        tokio::spawn(service.run());

        answer_initial_load(&mut menu, &mut orders, default_menu(), Vec::new()).await;
        store.login_admin("admin".into(), "admin123".into()).await.unwrap();

        let result = store.save_menu_item(MenuItem::new("neg", "Refund", "Main", -50.0)).await;
        assert!(matches!(result, Err(StoreError::Menu(MenuError::InvalidPrice { .. }))));
        assert!(menu.requests.try_recv().is_err());
        assert!(store.list_menu_items().await.unwrap().iter().all(|m| m.id != "neg"));
    }
}
