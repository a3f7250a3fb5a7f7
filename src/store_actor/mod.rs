//! The store service: cart, order lifecycle and realtime reconciliation.
//!
//! One actor owns the cart, the session and the local copies of `menu_items`
//! and `orders`. Requests and realtime events are handled one at a time on the
//! same task, so local writes and reconciliation never interleave mid-update.
//! Realtime events are always drained before the next request, which means a
//! caller reads its own completed writes.

mod error;
mod state;

pub use error::*;
pub use state::*;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{GatewayError, Row};
use crate::cart::{CartError, CartNotice};
use crate::clients::{RemoteGateway, StoreClient};
use crate::domain::{
    default_menu, order_id, MenuItem, MenuItemDraft, Order, OrderStatus, User, PHONE_NOT_AVAILABLE,
};
use crate::error::{OrderError, SessionError};
use crate::messages::StoreRequest;
use crate::notify::{dispatch_all, OrderNotifier};
use crate::queries;
use crate::reconcile::{apply_change, upsert_local, Applied, ChangeEvent, Placement};
use crate::storage::LocalStore;

type OrderIdFn = Box<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;

pub struct StoreService {
    receiver: mpsc::Receiver<StoreRequest>,
    gateway: RemoteGateway,
    local: LocalStore,
    notifiers: Vec<Arc<dyn OrderNotifier>>,
    state: AppState,
    menu_items: Vec<MenuItem>,
    orders: Vec<Order>,
    loading: watch::Sender<bool>,
    notices: broadcast::Sender<Notice>,
    next_order_id: OrderIdFn,
    utc_offset: FixedOffset,
}

impl StoreService {
    pub fn new(
        buffer_size: usize,
        gateway: RemoteGateway,
        local: LocalStore,
        notifiers: Vec<Arc<dyn OrderNotifier>>,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (loading, loading_rx) = watch::channel(true);
        let (notices, _) = broadcast::channel(buffer_size.max(16));

        let service = Self {
            receiver,
            gateway,
            state: AppState::restore(&local),
            local,
            notifiers,
            menu_items: Vec::new(),
            orders: Vec::new(),
            loading,
            notices: notices.clone(),
            next_order_id: Box::new(order_id),
            utc_offset: Utc.fix(),
        };
        (service, StoreClient::new(sender, loading_rx, notices))
    }

    pub fn with_order_ids(mut self, next_order_id: impl Fn(DateTime<Utc>) -> String + Send + Sync + 'static) -> Self {
        self.next_order_id = Box::new(next_order_id);
        self
    }

    /// Offset used to bucket sales by calendar day.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    #[instrument(name = "store_service", skip(self))]
    pub async fn run(mut self) {
        info!("StoreService starting");

        // Subscribe before the initial fetch so nothing committed in between is missed.
        let mut menu_events = self.gateway.subscribe_menu();
        let mut order_events = self.gateway.subscribe_orders();
        self.initial_load().await;

        let (mut menu_live, mut orders_live) = (true, true);
        loop {
            tokio::select! {
                biased;

                event = menu_events.recv(), if menu_live => {
                    menu_live = self.on_menu_event(event).await;
                }
                event = order_events.recv(), if orders_live => {
                    orders_live = self.on_order_event(event).await;
                }
                msg = self.receiver.recv() => match msg {
                    Some(StoreRequest::Shutdown) | None => {
                        info!("StoreService shutting down");
                        break;
                    }
                    Some(msg) => self.handle(msg).await,
                },
            }
        }

        info!("StoreService stopped");
    }

    async fn handle(&mut self, msg: StoreRequest) {
        match msg {
            StoreRequest::LoginAdmin { username, password, respond_to } => {
                let _ = respond_to.send(self.handle_login(User::admin(&username, &password)));
            }
            StoreRequest::LoginCustomer { name, phone, respond_to } => {
                let _ = respond_to.send(self.handle_login(User::customer(&name, &phone)));
            }
            StoreRequest::Logout { respond_to } => {
                self.state.sign_out(&self.local);
                info!("Logged out");
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::GetSession { respond_to } => {
                let _ = respond_to.send(Ok(self.state.session.clone()));
            }
            StoreRequest::ToggleTheme { respond_to } => {
                let _ = respond_to.send(Ok(self.state.toggle_theme(&self.local)));
            }
            StoreRequest::GetTheme { respond_to } => {
                let _ = respond_to.send(Ok(self.state.theme));
            }

            StoreRequest::AddItem { id, respond_to } => {
                let _ = respond_to.send(self.handle_add_item(id));
            }
            StoreRequest::RemoveItem { id, respond_to } => {
                self.state.cart.remove_item(&id);
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::UpdateQuantity { id, delta, respond_to } => {
                let _ = respond_to.send(self.state.cart.update_quantity(&id, delta).map_err(StoreError::from));
            }
            StoreRequest::ClearCart { respond_to } => {
                self.state.cart.clear();
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::GetCart { respond_to } => {
                let _ = respond_to.send(Ok(self.state.cart.items().to_vec()));
            }
            StoreRequest::GetCartTotals { respond_to } => {
                let _ = respond_to.send(Ok(self.state.cart.totals()));
            }

            StoreRequest::PlaceOrder { respond_to } => {
                let _ = respond_to.send(self.handle_place_order().await);
            }
            StoreRequest::UpdateOrderStatus { id, status, respond_to } => {
                let _ = respond_to.send(self.handle_update_order_status(id, status).await);
            }
            StoreRequest::DeleteOrder { id, respond_to } => {
                let _ = respond_to.send(self.handle_delete_order(id).await);
            }
            StoreRequest::ListOrders { respond_to } => {
                let _ = respond_to.send(Ok(queries::newest_first(&self.orders)));
            }
            StoreRequest::MyOrders { respond_to } => {
                let mine = match &self.state.session {
                    Some(user) => queries::my_orders(&queries::newest_first(&self.orders), user),
                    None => Vec::new(),
                };
                let _ = respond_to.send(Ok(mine));
            }
            StoreRequest::GetDashboard { respond_to } => {
                let _ = respond_to.send(Ok(queries::dashboard(&self.orders, self.utc_offset)));
            }

            StoreRequest::SaveMenuItem { item, respond_to } => {
                let _ = respond_to.send(self.handle_save_menu_item(item).await);
            }
            StoreRequest::CreateMenuItem { draft, respond_to } => {
                let _ = respond_to.send(self.handle_create_menu_item(draft).await);
            }
            StoreRequest::DeleteMenuItem { id, respond_to } => {
                let _ = respond_to.send(self.handle_delete_menu_item(id).await);
            }
            StoreRequest::SeedDefaults { respond_to } => {
                let _ = respond_to.send(self.handle_seed_defaults().await);
            }
            StoreRequest::ListMenuItems { respond_to } => {
                let _ = respond_to.send(Ok(self.menu_items.clone()));
            }
            StoreRequest::ListCategories { respond_to } => {
                let _ = respond_to.send(Ok(queries::categories(&self.menu_items)));
            }
            StoreRequest::FilterMenu { query, category, respond_to } => {
                let matches = queries::filter_menu(&self.menu_items, &query, category.as_deref());
                let _ = respond_to.send(Ok(matches.into_iter().cloned().collect()));
            }

            StoreRequest::Shutdown => {}
        }
    }

    // -------------------------------------------------------------------------
    // Loading and realtime sync
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn initial_load(&mut self) {
        match self.gateway.list_menu_items().await {
            Ok(items) => {
                self.menu_items = items;
                self.cache_menu();
            }
            Err(e) => {
                warn!(error = %e, "Menu fetch failed, using local cache");
                self.menu_items = self.local.menu_items();
                self.report_failure(&e);
            }
        }

        match self.gateway.list_orders().await {
            Ok(orders) => {
                self.orders = queries::newest_first(&orders);
                self.cache_orders();
            }
            Err(e) => {
                warn!(error = %e, "Order fetch failed, using local cache");
                self.orders = self.local.orders();
                self.report_failure(&e);
            }
        }

        self.loading.send_replace(false);
        info!(menu_count = self.menu_items.len(), order_count = self.orders.len(), "Initial load complete");
    }

    async fn on_menu_event(&mut self, event: Result<ChangeEvent<MenuItem>, RecvError>) -> bool {
        match event {
            Ok(event) => {
                let (kind, id) = (event.kind(), event.id().to_string());
                let applied = apply_change(&mut self.menu_items, event, Placement::Append);
                debug!(table = MenuItem::TABLE, kind, id = %id, ?applied, "Realtime event applied");
                if applied != Applied::Unchanged {
                    self.cache_menu();
                }
                true
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Menu subscription lagged, re-fetching");
                match self.gateway.list_menu_items().await {
                    Ok(items) => {
                        self.menu_items = items;
                        self.cache_menu();
                    }
                    Err(e) => self.report_failure(&e),
                }
                true
            }
            Err(RecvError::Closed) => {
                warn!("Menu subscription closed");
                false
            }
        }
    }

    async fn on_order_event(&mut self, event: Result<ChangeEvent<Order>, RecvError>) -> bool {
        match event {
            Ok(event) => {
                let (kind, id) = (event.kind(), event.id().to_string());
                let completed = matches!(&event, ChangeEvent::Update(o) if o.status == OrderStatus::Completed);
                let applied = apply_change(&mut self.orders, event, Placement::Prepend);
                debug!(table = Order::TABLE, kind, id = %id, ?applied, "Realtime event applied");

                match applied {
                    Applied::Unchanged => {}
                    Applied::Inserted if kind == "insert" => {
                        info!(order_id = %id, "New order received");
                        self.notify_ui(Notice::NewOrder { id });
                    }
                    _ if completed => {
                        info!(order_id = %id, "Order completed");
                        self.notify_ui(Notice::OrderReady { id });
                    }
                    _ => {}
                }
                if applied != Applied::Unchanged {
                    self.cache_orders();
                }
                true
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Order subscription lagged, re-fetching");
                match self.gateway.list_orders().await {
                    Ok(orders) => {
                        self.orders = queries::newest_first(&orders);
                        self.cache_orders();
                    }
                    Err(e) => self.report_failure(&e),
                }
                true
            }
            Err(RecvError::Closed) => {
                warn!("Order subscription closed");
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Session and cart
    // -------------------------------------------------------------------------

    fn handle_login(&mut self, user: Result<User, SessionError>) -> Result<User, StoreError> {
        let user = user.map_err(|e| {
            warn!(error = %e, "Login rejected");
            e
        })?;
        info!(user_name = %user.name, role = ?user.role, "Logged in");
        self.state.sign_in(user.clone(), &self.local);
        Ok(user)
    }

    #[instrument(skip(self))]
    fn handle_add_item(&mut self, id: String) -> Result<CartNotice, StoreError> {
        let item = self
            .menu_items
            .iter()
            .find(|m| m.id == id)
            .ok_or(CartError::UnknownItem(id))?;
        Ok(self.state.cart.add_item(item)?)
    }

    // -------------------------------------------------------------------------
    // Order lifecycle
    // -------------------------------------------------------------------------

    /// Returns `Ok(None)` without side effects when there is no session or
    /// the cart is empty. The cart survives a failed insert so the customer
    /// can retry.
    #[instrument(skip(self))]
    async fn handle_place_order(&mut self) -> Result<Option<Order>, StoreError> {
        let Some(user) = self.state.session.clone() else {
            debug!("No session, declining");
            return Ok(None);
        };
        if self.state.cart.is_empty() {
            debug!("Cart empty, declining");
            return Ok(None);
        }

        let totals = self.state.cart.totals();
        let created_at = Utc::now();
        let order = Order {
            id: (self.next_order_id)(created_at),
            customer_name: user.name,
            customer_phone: user.phone.unwrap_or_else(|| PHONE_NOT_AVAILABLE.to_string()),
            items: self.state.cart.items().to_vec(),
            subtotal: totals.subtotal,
            service_fee: totals.service_fee,
            total: totals.total,
            status: OrderStatus::Pending,
            created_at,
        };

        if let Err(e) = self.gateway.insert_order(order.clone()).await {
            error!(order_id = %order.id, error = %e, "Order insert failed, keeping cart");
            self.report_failure(&e);
            return Err(e.into());
        }

        self.state.cart.clear();
        upsert_local(&mut self.orders, order.clone(), Placement::Prepend);
        self.cache_orders();

        dispatch_all(&self.notifiers, &order);

        info!(order_id = %order.id, total = order.total, "Order placed");
        Ok(Some(order))
    }

    #[instrument(skip(self))]
    async fn handle_update_order_status(&mut self, id: String, status: OrderStatus) -> Result<Order, StoreError> {
        self.state.require_admin()?;

        let current = self
            .orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| OrderError::NotFound(id.clone()))?;
        let next = current.status.transition(status).map_err(|e| {
            warn!(error = %e, "Status transition refused");
            e
        })?;

        match self.gateway.update_order_status(id, next).await {
            Ok(order) => {
                upsert_local(&mut self.orders, order.clone(), Placement::Prepend);
                self.cache_orders();
                info!(status = %order.status, "Order status updated");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Status update failed, local status unchanged");
                self.report_failure(&e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn handle_delete_order(&mut self, id: String) -> Result<(), StoreError> {
        self.state.require_admin()?;

        match self.gateway.delete_order(id.clone()).await {
            Ok(()) | Err(GatewayError::NotFound { .. }) => {
                apply_change(&mut self.orders, ChangeEvent::Delete { id }, Placement::Prepend);
                self.cache_orders();
                info!("Order deleted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Order delete failed");
                self.report_failure(&e);
                Err(e.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Menu management
    // -------------------------------------------------------------------------

    /// Applied locally first. A failed remote write is reported but the local
    /// change is not rolled back.
    #[instrument(fields(item_id = %item.id), skip(self, item))]
    async fn handle_save_menu_item(&mut self, item: MenuItem) -> Result<(), StoreError> {
        self.state.require_admin()?;
        item.validate().map_err(|e| {
            warn!(error = %e, "Menu item rejected");
            e
        })?;

        upsert_local(&mut self.menu_items, item.clone(), Placement::Append);
        self.cache_menu();

        self.gateway.upsert_menu_item(item).await.map_err(|e| {
            error!(error = %e, "Menu save failed");
            self.report_failure(&e);
            StoreError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn handle_create_menu_item(&mut self, draft: MenuItemDraft) -> Result<MenuItem, StoreError> {
        let id = format!("custom_{}", Utc::now().timestamp_millis());
        let item = MenuItem::from_draft(id, draft);
        self.handle_save_menu_item(item.clone()).await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn handle_delete_menu_item(&mut self, id: String) -> Result<(), StoreError> {
        self.state.require_admin()?;

        apply_change(&mut self.menu_items, ChangeEvent::Delete { id: id.clone() }, Placement::Append);
        self.cache_menu();

        match self.gateway.delete_menu_item(id).await {
            Ok(()) | Err(GatewayError::NotFound { .. }) => Ok(()),
            Err(e) => {
                error!(error = %e, "Menu delete failed");
                self.report_failure(&e);
                Err(e.into())
            }
        }
    }

    /// One-time admin action. Never runs implicitly.
    #[instrument(skip(self))]
    async fn handle_seed_defaults(&mut self) -> Result<(), StoreError> {
        self.state.require_admin()?;

        let defaults = default_menu();
        if let Err(e) = self.gateway.insert_menu_items(defaults.clone()).await {
            error!(error = %e, "Seeding default menu failed");
            self.report_failure(&e);
            return Err(e.into());
        }

        for item in defaults {
            upsert_local(&mut self.menu_items, item, Placement::Append);
        }
        self.cache_menu();
        info!("Default menu seeded");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn cache_menu(&self) {
        if let Err(e) = self.local.save_menu_items(&self.menu_items) {
            warn!(error = %e, "Failed to cache menu");
        }
    }

    fn cache_orders(&self) {
        if let Err(e) = self.local.save_orders(&self.orders) {
            warn!(error = %e, "Failed to cache orders");
        }
    }

    fn report_failure(&self, error: &GatewayError) {
        self.notify_ui(Notice::SyncFailed { message: error.to_string() });
    }

    fn notify_ui(&self, notice: Notice) {
        // Nobody listening is fine.
        let _ = self.notices.send(notice);
    }
}
