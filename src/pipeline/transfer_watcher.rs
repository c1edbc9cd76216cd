//! Watched-wallet transfer watcher
//!
//! Spawned by the listener when a watched account deploys a pair. Polls
//! ERC-20 Transfer logs for the pair's two tokens and raises an alert
//! whenever a watched address is on either side of a transfer. Per-token
//! errors are logged and skipped; the watcher itself runs until process
//! shutdown.

use ethers::types::{Address, Log, H256, U256};
use ethers::utils::keccak256;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::analysis::checks::u256_to_f64;
use crate::chain::{is_filter_not_found, LogPoller};
use crate::feeds::EventFeed;
use crate::watchlist::WatchedAddresses;

const TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// Poll cadence; transfers are less urgent than pair creations
const TRANSFER_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct TransferWatcher {
    poller: Arc<dyn LogPoller>,
    tokens: Vec<Address>,
    watched: WatchedAddresses,
    alerts: EventFeed,
    transfer_topic: H256,
}

impl TransferWatcher {
    pub fn new(
        poller: Arc<dyn LogPoller>,
        tokens: Vec<Address>,
        watched: WatchedAddresses,
        alerts: EventFeed,
    ) -> Self {
        Self {
            poller,
            tokens,
            watched,
            alerts,
            transfer_topic: H256::from_slice(keccak256(TRANSFER_SIGNATURE.as_bytes()).as_slice()),
        }
    }

    pub async fn run(self) {
        info!("Transfer watcher running for {} token(s)", self.tokens.len());
        let mut filters = self.install_filters().await;

        loop {
            self.poll_cycle(&mut filters).await;
            tokio::time::sleep(TRANSFER_POLL_INTERVAL).await;
        }
    }

    /// One Transfer filter per tracked token. Tokens whose filter cannot be
    /// installed are dropped with a log line.
    async fn install_filters(&self) -> Vec<(Address, U256)> {
        let mut filters = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match self.poller.install_filter(*token, self.transfer_topic).await {
                Ok(id) => filters.push((*token, id)),
                Err(e) => warn!("Could not track token {:#x}: {}", token, e),
            }
        }
        filters
    }

    async fn poll_cycle(&self, filters: &mut Vec<(Address, U256)>) {
        for entry in filters.iter_mut() {
            let (token, filter_id) = *entry;
            match self.poller.poll_filter(filter_id).await {
                Ok(logs) => {
                    for log in logs {
                        self.handle_transfer(token, &log).await;
                    }
                }
                Err(e) if is_filter_not_found(&e) => {
                    match self.poller.install_filter(token, self.transfer_topic).await {
                        Ok(id) => entry.1 = id,
                        Err(e) => warn!("Could not recreate filter for {:#x}: {}", token, e),
                    }
                }
                Err(e) => warn!("Error polling transfers for {:#x}: {}", token, e),
            }
        }
    }

    async fn handle_transfer(&self, token: Address, log: &Log) {
        if log.topics.len() < 3 || log.data.len() < 32 {
            return;
        }
        let sender = format!(
            "{:#x}",
            Address::from_slice(&log.topics[1].as_bytes()[12..])
        );
        let recipient = format!(
            "{:#x}",
            Address::from_slice(&log.topics[2].as_bytes()[12..])
        );

        if !self.watched.contains(&sender) && !self.watched.contains(&recipient) {
            return;
        }

        let value = U256::from_big_endian(&log.data[0..32]);
        let value_tokens = u256_to_f64(value) / 1e18;
        let message = format!(
            "{:#x}: {} -> {} | {:.4} tokens",
            token, sender, recipient, value_tokens
        );
        info!("Watched wallet transfer: {}", message);
        self.alerts.push(message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Result;
    use async_trait::async_trait;
    use ethers::types::Bytes;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn topic_for(address: Address) -> H256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        H256::from(bytes)
    }

    fn transfer_log(from: Address, to: Address, value_wei: u128) -> Log {
        let topic0 =
            H256::from_slice(keccak256(TRANSFER_SIGNATURE.as_bytes()).as_slice());
        let mut data = [0u8; 32];
        U256::from(value_wei).to_big_endian(&mut data);
        Log {
            topics: vec![topic0, topic_for(from), topic_for(to)],
            data: Bytes::from(data.to_vec()),
            ..Default::default()
        }
    }

    struct OneBatchPoller {
        logs: tokio::sync::Mutex<Vec<Log>>,
    }

    #[async_trait]
    impl LogPoller for OneBatchPoller {
        async fn install_filter(&self, _address: Address, _topic: H256) -> Result<U256> {
            Ok(U256::one())
        }

        async fn poll_filter(&self, _filter_id: U256) -> Result<Vec<Log>> {
            Ok(std::mem::take(&mut *self.logs.lock().await))
        }

        async fn is_alive(&self) -> bool {
            true
        }
    }

    async fn run_one_cycle(watched: WatchedAddresses, logs: Vec<Log>) -> Vec<String> {
        let poller = Arc::new(OneBatchPoller {
            logs: tokio::sync::Mutex::new(logs),
        });
        let alerts = EventFeed::new("alerts");
        let watcher = TransferWatcher::new(poller, vec![addr(0xaa)], watched, alerts.clone());

        let mut filters = watcher.install_filters().await;
        watcher.poll_cycle(&mut filters).await;
        alerts.snapshot().await
    }

    #[tokio::test]
    async fn test_watched_sender_raises_alert() {
        let watched = WatchedAddresses::from_iter([format!("{:#x}", addr(0x42))]);
        let logs = vec![transfer_log(addr(0x42), addr(0x43), 2_000_000_000_000_000_000)];

        let alerts = run_one_cycle(watched, logs).await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains(&format!("{:#x}", addr(0x42))));
        assert!(alerts[0].contains("2.0000 tokens"));
    }

    #[tokio::test]
    async fn test_unwatched_transfer_is_silent() {
        let watched = WatchedAddresses::from_iter([format!("{:#x}", addr(0x42))]);
        let logs = vec![transfer_log(addr(0x01), addr(0x02), 1)];

        let alerts = run_one_cycle(watched, logs).await;
        assert!(alerts.is_empty());
    }
}
