/// Installs the global subscriber. Honors `RUST_LOG`, falling back to `info`.
///
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=foodieq::store_actor=debug,foodieq::actor_framework=info cargo run
/// ```
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
