//! PairCreated event source
//!
//! Watches one factory contract for its pair-creation event through a
//! provider-side log filter. Polling is pull-based: each `poll` returns the
//! entries accumulated since the previous call, which may be none.
//!
//! Filters are ephemeral on most providers. When the upstream answers
//! "filter not found" the filter is recreated in place; when the transport
//! dies the caller reconnects and calls `resubscribe`. Events emitted during
//! either gap are lost by design — there is no backfill.

use ethers::types::{Address, Log, H256, U256};
use ethers::utils::keccak256;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{is_filter_not_found, LogPoller, Result};
use crate::models::PairCreatedEvent;

pub struct PairCreatedSource {
    poller: Arc<dyn LogPoller>,
    factory: Address,
    topic: H256,
    filter_id: Option<U256>,
}

impl PairCreatedSource {
    /// `event_signature` is the canonical text form, e.g.
    /// `PairCreated(address,address,address,uint256)`.
    pub fn new(poller: Arc<dyn LogPoller>, factory: Address, event_signature: &str) -> Self {
        let topic = H256::from_slice(keccak256(event_signature.as_bytes()).as_slice());
        Self {
            poller,
            factory,
            topic,
            filter_id: None,
        }
    }

    /// Install the address + topic filter upstream.
    pub async fn subscribe(&mut self) -> Result<()> {
        let id = self.poller.install_filter(self.factory, self.topic).await?;
        self.filter_id = Some(id);
        info!("Subscribed to pair creation events on factory {:#x}", self.factory);
        Ok(())
    }

    /// Drop the current filter id and install a fresh one.
    pub async fn resubscribe(&mut self) -> Result<()> {
        self.filter_id = None;
        self.subscribe().await
    }

    /// Transport health, checked by the caller before each poll cycle.
    pub async fn is_alive(&self) -> bool {
        self.poller.is_alive().await
    }

    /// New creation events since the last poll.
    ///
    /// A provider-side filter eviction is handled here: the filter is
    /// recreated and an empty batch returned, so the caller's loop cadence is
    /// undisturbed. Any other upstream error propagates to the caller.
    pub async fn poll(&mut self) -> Result<Vec<PairCreatedEvent>> {
        if self.filter_id.is_none() {
            self.subscribe().await?;
        }
        let filter_id = self.filter_id.unwrap_or_default();

        let logs = match self.poller.poll_filter(filter_id).await {
            Ok(logs) => logs,
            Err(e) if is_filter_not_found(&e) => {
                warn!("Log filter evicted upstream, recreating");
                self.resubscribe().await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            match self.decode(&log) {
                Some(event) => events.push(event),
                None => {
                    warn!(
                        "Skipping undecodable log from {:#x} (topics: {})",
                        log.address,
                        log.topics.len()
                    );
                }
            }
        }
        if !events.is_empty() {
            debug!("Poll returned {} new pair creation event(s)", events.len());
        }
        Ok(events)
    }

    /// Decode a raw PairCreated log: token0/token1 are indexed topics, the
    /// pair address is the first data word.
    fn decode(&self, log: &Log) -> Option<PairCreatedEvent> {
        if log.topics.first() != Some(&self.topic) || log.topics.len() < 3 {
            return None;
        }
        if log.data.len() < 32 {
            return None;
        }

        let token0 = Address::from_slice(&log.topics[1].as_bytes()[12..]);
        let token1 = Address::from_slice(&log.topics[2].as_bytes()[12..]);
        let pair = Address::from_slice(&log.data[12..32]);

        Some(PairCreatedEvent {
            token0,
            token1,
            pair,
            tx_hash: log.transaction_hash,
            log_index: log.log_index,
            block_number: log.block_number.map(|n| n.as_u64()),
        })
    }
}
