use tokio::sync::oneshot;

use crate::cart::{CartNotice, CartTotals};
use crate::domain::{CartItem, MenuItem, MenuItemDraft, Order, OrderStatus, User};
use crate::queries::Dashboard;
use crate::store_actor::{StoreError, Theme};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

type Reply<T> = ServiceResponse<T, StoreError>;

/// Requests served by the store service, one variant per operation. Each
/// carries its parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum StoreRequest {
    // Session
    LoginAdmin { username: String, password: String, respond_to: Reply<User> },
    LoginCustomer { name: String, phone: String, respond_to: Reply<User> },
    Logout { respond_to: Reply<()> },
    GetSession { respond_to: Reply<Option<User>> },
    ToggleTheme { respond_to: Reply<Theme> },
    GetTheme { respond_to: Reply<Theme> },

    // Cart
    AddItem { id: String, respond_to: Reply<CartNotice> },
    RemoveItem { id: String, respond_to: Reply<()> },
    UpdateQuantity { id: String, delta: i64, respond_to: Reply<()> },
    ClearCart { respond_to: Reply<()> },
    GetCart { respond_to: Reply<Vec<CartItem>> },
    GetCartTotals { respond_to: Reply<CartTotals> },

    // Orders
    PlaceOrder { respond_to: Reply<Option<Order>> },
    UpdateOrderStatus { id: String, status: OrderStatus, respond_to: Reply<Order> },
    DeleteOrder { id: String, respond_to: Reply<()> },
    ListOrders { respond_to: Reply<Vec<Order>> },
    MyOrders { respond_to: Reply<Vec<Order>> },
    GetDashboard { respond_to: Reply<Dashboard> },

    // Menu
    SaveMenuItem { item: MenuItem, respond_to: Reply<()> },
    CreateMenuItem { draft: MenuItemDraft, respond_to: Reply<MenuItem> },
    DeleteMenuItem { id: String, respond_to: Reply<()> },
    SeedDefaults { respond_to: Reply<()> },
    ListMenuItems { respond_to: Reply<Vec<MenuItem>> },
    ListCategories { respond_to: Reply<Vec<String>> },
    FilterMenu { query: String, category: Option<String>, respond_to: Reply<Vec<MenuItem>> },

    Shutdown,
}
