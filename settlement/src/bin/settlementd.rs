//! Settlement dispatcher daemon

use ledger_store::MemoryStore;
use settlement::{Config, Dispatcher};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting ClearRail settlement daemon");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        "Settling for bank prefix '{}' against registry {}",
        config.bank_prefix,
        config.registry.base_url
    );

    // In-memory reference store; swap for a persistent backend by
    // implementing the ledger-store traits against config.store.url
    let store = Arc::new(MemoryStore::new());

    let dispatcher = Arc::new(Dispatcher::from_config(&config, store)?);

    tokio::select! {
        _ = dispatcher.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down settlement daemon");
        }
    }

    Ok(())
}
