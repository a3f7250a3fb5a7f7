use tracing::{error, info, warn, Instrument};

use foodieq::{setup_tracing, Config, OrderStatus, StoreSystem};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load().map_err(|e| e.to_string())?;
    info!("Starting storefront");

    let system = StoreSystem::new(&config);
    let store = system.store_client.clone();
    store.wait_until_loaded().await.map_err(|e| e.to_string())?;

    // Admin seeds the catalog on first run.
    let span = tracing::info_span!("menu_setup");
    async {
        store.login_admin("admin".into(), "admin123".into()).await?;
        if store.list_menu_items().await?.is_empty() {
            store.seed_defaults().await?;
        }
        store.logout().await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // A customer orders two items.
    let span = tracing::info_span!("checkout");
    let placed = async {
        store.login_customer("Aina".into(), "0123456789".into()).await?;
        store.add_item("m1".into()).await?;
        store.add_item("m2".into()).await?;
        let totals = store.get_cart_totals().await?;
        info!(subtotal = totals.subtotal, total = totals.total, "Checking out");
        let order = store.place_order().await?;
        store.logout().await?;
        Ok::<_, foodieq::StoreError>(order)
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let Some(order) = placed else {
        warn!("Nothing was ordered");
        return system.shutdown().await;
    };
    info!(order_id = %order.id, total = order.total, "Order placed");

    // The kitchen completes it. A late cancellation is refused.
    let span = tracing::info_span!("kitchen");
    async {
        store.login_admin("admin".into(), "admin123".into()).await?;
        store.update_order_status(order.id.clone(), OrderStatus::Completed).await?;

        match store.update_order_status(order.id.clone(), OrderStatus::Cancelled).await {
            Ok(_) => error!("Completed order was cancelled"),
            Err(e) => info!(error = %e, "Late cancellation refused"),
        }

        let stats = store.get_dashboard().await?;
        info!(
            pending = stats.pending,
            completed = stats.completed,
            revenue = stats.revenue,
            "Dashboard"
        );
        store.logout().await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
