use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, instrument};

use crate::cart::{CartNotice, CartTotals};
use crate::client_method;
use crate::domain::{CartItem, MenuItem, MenuItemDraft, Order, OrderStatus, User};
use crate::messages::StoreRequest;
use crate::queries::Dashboard;
use crate::store_actor::{Notice, StoreError, Theme};

/// Client for the store service. This is everything the view layer calls.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
    loading: watch::Receiver<bool>,
    notices: broadcast::Sender<Notice>,
}

impl StoreClient {
    pub fn new(
        sender: mpsc::Sender<StoreRequest>,
        loading: watch::Receiver<bool>,
        notices: broadcast::Sender<Notice>,
    ) -> Self {
        Self { sender, loading, notices }
    }

    /// True until the initial fetch of both tables has finished. Mutations
    /// should not be offered to the user while this holds.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub async fn wait_until_loaded(&self) -> Result<(), StoreError> {
        let mut loading = self.loading.clone();
        loading
            .wait_for(|loading| !*loading)
            .await
            .map(|_| ())
            .map_err(|_| StoreError::ActorCommunicationError("Store stopped while loading".to_string()))
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    // Written out by hand so the password never lands in a span.
    #[instrument(skip(self, password))]
    pub async fn login_admin(&self, username: String, password: String) -> Result<User, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::LoginAdmin { username, password, respond_to })
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|e| StoreError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(StoreClient => fn login_customer(name: String, phone: String) -> User as StoreRequest::LoginCustomer, Error = StoreError);
client_method!(StoreClient => fn logout() -> () as StoreRequest::Logout, Error = StoreError);
client_method!(StoreClient => fn get_session() -> Option<User> as StoreRequest::GetSession, Error = StoreError);
client_method!(StoreClient => fn toggle_theme() -> Theme as StoreRequest::ToggleTheme, Error = StoreError);
client_method!(StoreClient => fn get_theme() -> Theme as StoreRequest::GetTheme, Error = StoreError);

client_method!(StoreClient => fn add_item(id: String) -> CartNotice as StoreRequest::AddItem, Error = StoreError);
client_method!(StoreClient => fn remove_item(id: String) -> () as StoreRequest::RemoveItem, Error = StoreError);
client_method!(StoreClient => fn update_quantity(id: String, delta: i64) -> () as StoreRequest::UpdateQuantity, Error = StoreError);
client_method!(StoreClient => fn clear_cart() -> () as StoreRequest::ClearCart, Error = StoreError);
client_method!(StoreClient => fn get_cart() -> Vec<CartItem> as StoreRequest::GetCart, Error = StoreError);
client_method!(StoreClient => fn get_cart_totals() -> CartTotals as StoreRequest::GetCartTotals, Error = StoreError);

client_method!(StoreClient => fn place_order() -> Option<Order> as StoreRequest::PlaceOrder, Error = StoreError);
client_method!(StoreClient => fn update_order_status(id: String, status: OrderStatus) -> Order as StoreRequest::UpdateOrderStatus, Error = StoreError);
client_method!(StoreClient => fn delete_order(id: String) -> () as StoreRequest::DeleteOrder, Error = StoreError);
client_method!(StoreClient => fn list_orders() -> Vec<Order> as StoreRequest::ListOrders, Error = StoreError);
client_method!(StoreClient => fn my_orders() -> Vec<Order> as StoreRequest::MyOrders, Error = StoreError);
client_method!(StoreClient => fn get_dashboard() -> Dashboard as StoreRequest::GetDashboard, Error = StoreError);

client_method!(StoreClient => fn save_menu_item(item: MenuItem) -> () as StoreRequest::SaveMenuItem, Error = StoreError);
client_method!(StoreClient => fn create_menu_item(draft: MenuItemDraft) -> MenuItem as StoreRequest::CreateMenuItem, Error = StoreError);
client_method!(StoreClient => fn delete_menu_item(id: String) -> () as StoreRequest::DeleteMenuItem, Error = StoreError);
client_method!(StoreClient => fn seed_defaults() -> () as StoreRequest::SeedDefaults, Error = StoreError);
client_method!(StoreClient => fn list_menu_items() -> Vec<MenuItem> as StoreRequest::ListMenuItems, Error = StoreError);
client_method!(StoreClient => fn list_categories() -> Vec<String> as StoreRequest::ListCategories, Error = StoreError);
client_method!(StoreClient => fn filter_menu(query: String, category: Option<String>) -> Vec<MenuItem> as StoreRequest::FilterMenu, Error = StoreError);
