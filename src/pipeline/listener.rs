//! Blockchain listener loop
//!
//! One long-lived task per chain event source. Each cycle: health-probe the
//! transport (reconnecting if dead), poll for new pair creation events,
//! process each in delivery order, sleep. Errors never terminate the loop —
//! they are logged, surfaced on the status feed, and followed by a longer
//! backoff sleep so a flapping provider is not hammered.
//!
//! Per-event state machine, terminal on either branch:
//! derive identity (missing -> dropped with a diagnostic) -> skip if already
//! seen -> watchlist hook -> run checks -> commit record
//! (Inserted | DuplicateSkipped).

use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::analysis::PairAnalyzer;
use crate::chain::source::PairCreatedSource;
use crate::chain::{ChainReader, LogPoller};
use crate::feeds::EventFeed;
use crate::models::PairCreatedEvent;
use crate::pipeline::identity::EventIdentity;
use crate::pipeline::transfer_watcher::TransferWatcher;
use crate::storage::{CommitOutcome, EventStore};
use crate::watchlist::WatchedAddresses;

pub struct PairListener {
    source: PairCreatedSource,
    chain: Arc<dyn ChainReader>,
    poller: Arc<dyn LogPoller>,
    analyzer: PairAnalyzer,
    store: Arc<dyn EventStore>,
    watched: WatchedAddresses,
    status: EventFeed,
    alerts: EventFeed,
    /// Steady-state delay between polls
    poll_interval: Duration,
    /// Delay after an upstream error, doubling as backoff
    error_backoff: Duration,
}

impl PairListener {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: PairCreatedSource,
        chain: Arc<dyn ChainReader>,
        poller: Arc<dyn LogPoller>,
        analyzer: PairAnalyzer,
        store: Arc<dyn EventStore>,
        watched: WatchedAddresses,
        status: EventFeed,
        alerts: EventFeed,
        poll_interval: Duration,
        error_backoff: Duration,
    ) -> Self {
        Self {
            source,
            chain,
            poller,
            analyzer,
            store,
            watched,
            status,
            alerts,
            poll_interval,
            error_backoff,
        }
    }

    /// Run until process shutdown.
    pub async fn run(mut self) {
        self.status.push("Blockchain listener started...").await;

        match self.source.subscribe().await {
            Ok(()) => self.status.push("Connected & listening...").await,
            Err(e) => {
                error!("Initial subscription failed: {}", e);
                self.status
                    .push(format!("Error in blockchain listener: {}", e))
                    .await;
                tokio::time::sleep(self.error_backoff).await;
            }
        }

        loop {
            if !self.source.is_alive().await {
                warn!("Provider connection lost, resubscribing");
                self.status.push("Provider connection lost, reconnecting...").await;
                match self.source.resubscribe().await {
                    Ok(()) => {
                        // Events emitted during the gap are gone; no backfill
                        self.status.push("Reconnected to provider").await;
                    }
                    Err(e) => {
                        error!("Reconnect failed: {}", e);
                        self.status
                            .push(format!("Error in blockchain listener: {}", e))
                            .await;
                        tokio::time::sleep(self.error_backoff).await;
                        continue;
                    }
                }
            }

            match self.source.poll().await {
                Ok(events) => {
                    // Delivery order within one poll is preserved
                    for event in &events {
                        self.process_event(event).await;
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    error!("Error in blockchain listener: {}", e);
                    self.status
                        .push(format!("Error in blockchain listener: {}", e))
                        .await;
                    tokio::time::sleep(self.error_backoff).await;
                }
            }
        }
    }

    pub(crate) async fn process_event(&self, event: &PairCreatedEvent) {
        let identity = match EventIdentity::derive(event) {
            Ok(identity) => identity,
            Err(e) => {
                // Not retried: the same malformed event would recur identically
                warn!(
                    "Dropping pair creation event for {:#x}: {}",
                    event.pair, e
                );
                return;
            }
        };

        // Cheap skip for redeliveries; the conditional insert below stays the
        // authoritative gate.
        match self.store.contains(&identity).await {
            Ok(true) => {
                debug!("Pair event {} already recorded", identity.storage_key());
                return;
            }
            Ok(false) => {}
            Err(e) => warn!("Dedup pre-check failed, relying on commit: {}", e),
        }

        info!(
            "New pair created: {:#x} (token0 {:#x}, token1 {:#x})",
            event.pair, event.token0, event.token1
        );

        self.watchlist_hook(event).await;

        let record = self.analyzer.analyze(event, &identity).await;

        match self.store.insert_if_absent(&identity, &record).await {
            Ok(CommitOutcome::Inserted) => {
                self.status
                    .push(format!(
                        "New pair {}: liquidity {:.4} ETH, honeypot {}, renounced {}",
                        record.pair_address,
                        record.liquidity_eth,
                        record.honeypot,
                        record.ownership_renounced
                    ))
                    .await;
            }
            Ok(CommitOutcome::DuplicateSkipped) => {
                // Expected under at-least-once delivery
                debug!("Record for {} already committed", identity.storage_key());
            }
            Err(e) => {
                // Not retried this cycle; a redelivery lands once the store
                // recovers
                error!("Failed to persist pair record: {}", e);
                self.status
                    .push(format!("Failed to persist pair record: {}", e))
                    .await;
            }
        }
    }

    /// Alert and start a transfer watcher when the deploying account is
    /// watched. Fire-and-forget: the pipeline never blocks on the watcher.
    async fn watchlist_hook(&self, event: &PairCreatedEvent) {
        if self.watched.is_empty() {
            return;
        }
        let Some(tx_hash) = event.tx_hash else {
            return;
        };

        let deployer = match self.chain.transaction_sender(tx_hash).await {
            Ok(Some(sender)) => format!("{:#x}", sender),
            Ok(None) => {
                debug!("Transaction {:#x} not found for watchlist check", tx_hash);
                return;
            }
            Err(e) => {
                warn!("Could not fetch deployer for watchlist check: {}", e);
                return;
            }
        };

        if !self.watched.contains(&deployer) {
            return;
        }

        let message = format!("Deployer {} is in watchlist!", deployer);
        warn!("{}", message);
        self.alerts.push(message).await;

        let watcher = TransferWatcher::new(
            self.poller.clone(),
            vec![event.token0, event.token1],
            self.watched.clone(),
            self.alerts.clone(),
        );
        tokio::spawn(watcher.run());
    }
}
