use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::actor_framework::TableActor;
use crate::clients::{RemoteGateway, StoreClient};
use crate::config::Config;
use crate::domain::{MenuItem, Order};
use crate::notify::{ChatNotifier, OrderNotifier, SheetNotifier};
use crate::storage::LocalStore;
use crate::store_actor::StoreService;

/// The running storefront: both backend tables plus the store service.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StoreSystem {
    pub store_client: StoreClient,
    /// Direct handle on the backend, as any other device would see it.
    pub gateway: RemoteGateway,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl StoreSystem {
    pub fn new(config: &Config) -> Self {
        Self::with_notifiers(config, build_notifiers(config))
    }

    pub fn with_notifiers(config: &Config, notifiers: Vec<Arc<dyn OrderNotifier>>) -> Self {
        let buffer = config.channel_buffer;

        // 1. Backend tables
        let (menu_actor, menu_client) = TableActor::<MenuItem>::new(buffer);
        let menu_handle = tokio::spawn(menu_actor.run());

        let (order_actor, order_client) = TableActor::<Order>::new(buffer);
        let order_handle = tokio::spawn(order_actor.run());

        let gateway = RemoteGateway::new(menu_client, order_client);

        // 2. Store service on top of them
        let local = LocalStore::new(&config.data_dir);
        info!(data_dir = %local.root().display(), "Using local data directory");
        let (store, store_client) = StoreService::new(buffer, gateway.clone(), local, notifiers);
        let store_handle = tokio::spawn(store.with_utc_offset(config.utc_offset).run());

        info!("Store system started");

        Self {
            store_client,
            gateway,
            handles: vec![store_handle, menu_handle, order_handle],
        }
    }

    /// Stops the store service before the tables it depends on.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        if let Err(e) = self.store_client.shutdown().await {
            warn!(error = %e, "Store service already stopped");
        }
        self.gateway.shutdown().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

/// Notifiers for every channel the configuration enables. Missing settings
/// just leave that channel out.
pub fn build_notifiers(config: &Config) -> Vec<Arc<dyn OrderNotifier>> {
    let client = Client::new();
    let mut notifiers: Vec<Arc<dyn OrderNotifier>> = Vec::new();

    match &config.sheet_url {
        Some(url) => notifiers.push(Arc::new(SheetNotifier::new(client.clone(), url, config.utc_offset))),
        None => info!("Sheet webhook not configured"),
    }

    match config.chat_credentials() {
        Some((token, chat_id)) => notifiers.push(Arc::new(ChatNotifier::new(
            client,
            &config.chat_api_base,
            token,
            chat_id,
            config.currency.clone(),
        ))),
        None => info!("Chat bot not configured"),
    }

    notifiers
}
