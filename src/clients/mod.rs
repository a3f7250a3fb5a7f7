mod macros;
mod gateway;
mod store_client;

pub use gateway::*;
pub use store_client::*;
