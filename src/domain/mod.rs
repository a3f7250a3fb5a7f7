pub mod menu;
pub mod order;
pub mod user;

pub use menu::*;
pub use order::*;
pub use user::*;
