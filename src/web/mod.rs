//! Web API module
//!
//! REST surface over the pipeline's outputs: recorded token events, the
//! status and alert feeds, and the configured watchlist. Read-only — the
//! pipeline is driven by chain events, never by API calls.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

use std::sync::Arc;

use crate::feeds::EventFeed;
use crate::storage::EventStore;
use crate::watchlist::WatchedAddresses;

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Committed pair analysis records
    pub store: Arc<dyn EventStore>,
    /// Listener progress feed
    pub status: EventFeed,
    /// Watched-wallet alert feed
    pub alerts: EventFeed,
    /// Watched deployer addresses
    pub watched: Arc<WatchedAddresses>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        status: EventFeed,
        alerts: EventFeed,
        watched: Arc<WatchedAddresses>,
    ) -> Self {
        Self {
            store,
            status,
            alerts,
            watched,
        }
    }
}
