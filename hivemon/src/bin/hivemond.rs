//! The fleet monitor daemon.
//!
//! Wires the registry, poller, network fetcher and API server together
//! and runs until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use hivemon::api::{self, SharedState};
use hivemon::config::Config;
use hivemon::network::{NetworkFetcher, NetworkSnapshot};
use hivemon::poller;
use hivemon::registry::DeviceRegistry;
use hivemon::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    hivemon::tracing::init();

    let config = Config::from_env();

    let store = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let registry = Arc::new(DeviceRegistry::new(store));
    registry.load().await;

    let (network_tx, network_rx) = watch::channel(NetworkSnapshot::default());
    let running = CancellationToken::new();

    let poller_task = tokio::spawn(poller::task(registry.clone(), running.clone()));
    let fetcher = NetworkFetcher::new(config.network_api_base.clone());
    let fetcher_task = tokio::spawn(fetcher.run(network_tx, running.clone()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    let state = SharedState {
        registry,
        network_rx,
    };
    let server_task = tokio::spawn(api::serve(listener, state, running.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    running.cancel();

    let _ = poller_task.await;
    let _ = fetcher_task.await;
    let _ = server_task.await;

    Ok(())
}
