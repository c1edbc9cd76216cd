use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod analysis;
mod chain;
mod config;
mod error;
mod feeds;
mod models;
mod pipeline;
mod storage;
mod watchlist;
mod web;

use crate::analysis::PairAnalyzer;
use crate::chain::client::EvmClient;
use crate::chain::source::PairCreatedSource;
use crate::chain::{ChainReader, LogPoller};
use crate::config::Config;
use crate::feeds::EventFeed;
use crate::pipeline::PairListener;
use crate::storage::{EventStore, MemoryStore, SledStore};
use crate::watchlist::WatchedAddresses;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv().ok();

    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    // Connect to the chain; the URL scheme selects the transport
    let client = Arc::new(EvmClient::connect(&config.web3_provider).await?);
    let chain: Arc<dyn ChainReader> = client.clone();
    let poller: Arc<dyn LogPoller> = client;
    info!("Connected to provider {}", config.web3_provider);

    // Durable ledger when a path is configured, in-memory otherwise
    let store: Arc<dyn EventStore> = match &config.store_path {
        Some(path) => {
            info!("Using sled store at {}", path);
            Arc::new(SledStore::open(path)?)
        }
        None => {
            info!("No STORE_PATH configured, records will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let watched = Arc::new(WatchedAddresses::load(&config.watchlist_path)?);
    let status = EventFeed::with_capacity("status", config.feed_capacity);
    let alerts = EventFeed::with_capacity("alerts", config.feed_capacity);

    let analyzer = PairAnalyzer::new(
        chain.clone(),
        config.weth_address,
        config.router_address,
        config.probe_amount_wei,
        config.honeypot_ratio_threshold,
    );
    let source = PairCreatedSource::new(
        poller.clone(),
        config.factory_address,
        &config.pair_created_signature,
    );

    let listener = PairListener::new(
        source,
        chain,
        poller,
        analyzer,
        store.clone(),
        watched.as_ref().clone(),
        status.clone(),
        alerts.clone(),
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_millis(config.error_backoff_ms),
    );
    tokio::spawn(listener.run());
    info!("Pair listener started");

    // Serve the API until shutdown
    let state = AppState::new(store, status, alerts, watched);
    web::server::start_server(state, config).await
}
