//! ethers-backed chain client
//!
//! One client type over either transport; the endpoint URL scheme decides
//! which at startup. The connection is verified with a block-number call
//! before the client is handed out.

use async_trait::async_trait;
use ethers::providers::{FilterKind, Http, Middleware, Provider, Ws};
use ethers::types::{Address, Filter, Log, TransactionRequest, H256, U256};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ChainReader, LogPoller, Result};
use crate::error::PairwatchError;

/// Upper bound on the pre-poll health probe
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

enum Transport {
    Http(Provider<Http>),
    Ws(Provider<Ws>),
}

pub struct EvmClient {
    transport: Transport,
}

impl EvmClient {
    /// Connect over HTTP and verify the node answers.
    pub async fn new_http(endpoint: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(endpoint)
            .map_err(|e| PairwatchError::ChainError(format!("Invalid HTTP endpoint: {}", e)))?;

        provider
            .get_block_number()
            .await
            .map_err(|e| PairwatchError::ChainError(format!("Failed to reach node: {}", e)))?;

        Ok(Self {
            transport: Transport::Http(provider),
        })
    }

    /// Connect over WebSocket and verify the node answers.
    pub async fn new_ws(endpoint: &str) -> Result<Self> {
        let provider = Provider::<Ws>::connect(endpoint)
            .await
            .map_err(|e| PairwatchError::ChainError(format!("WebSocket connect failed: {}", e)))?;

        provider
            .get_block_number()
            .await
            .map_err(|e| PairwatchError::ChainError(format!("Failed to reach node: {}", e)))?;

        Ok(Self {
            transport: Transport::Ws(provider),
        })
    }

    /// Pick the transport from the URL scheme (`ws://`/`wss://` vs HTTP).
    pub async fn connect(endpoint: &str) -> Result<Self> {
        if endpoint.starts_with("ws") {
            Self::new_ws(endpoint).await
        } else {
            Self::new_http(endpoint).await
        }
    }
}

macro_rules! with_provider {
    ($self:expr, $provider:ident => $body:expr) => {
        match &$self.transport {
            Transport::Http($provider) => $body,
            Transport::Ws($provider) => $body,
        }
    };
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let tx = TransactionRequest::new().to(to).data(data);
        let out = with_provider!(self, provider => {
            provider
                .call(&tx.into(), None)
                .await
                .map_err(|e| PairwatchError::ChainError(format!("eth_call failed: {}", e)))?
        });
        Ok(out.to_vec())
    }

    async fn transaction_sender(&self, tx_hash: H256) -> Result<Option<Address>> {
        let tx = with_provider!(self, provider => {
            provider
                .get_transaction(tx_hash)
                .await
                .map_err(|e| PairwatchError::ChainError(format!("get_transaction failed: {}", e)))?
        });
        Ok(tx.map(|t| t.from))
    }
}

#[async_trait]
impl LogPoller for EvmClient {
    async fn install_filter(&self, address: Address, topic: H256) -> Result<U256> {
        let filter = Filter::new().address(address).topic0(topic);
        let id = with_provider!(self, provider => {
            provider
                .new_filter(FilterKind::Logs(&filter))
                .await
                .map_err(|e| PairwatchError::ChainError(format!("new_filter failed: {}", e)))?
        });
        debug!("Installed log filter {} on {:#x}", id, address);
        Ok(id)
    }

    async fn poll_filter(&self, filter_id: U256) -> Result<Vec<Log>> {
        let logs: Vec<Log> = with_provider!(self, provider => {
            provider
                .get_filter_changes(filter_id)
                .await
                .map_err(|e| PairwatchError::ChainError(format!("get_filter_changes failed: {}", e)))?
        });
        Ok(logs)
    }

    async fn is_alive(&self) -> bool {
        let probe = with_provider!(self, provider => {
            timeout(HEALTH_PROBE_TIMEOUT, provider.get_block_number()).await
        });
        match probe {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!("Health probe failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Health probe timed out after {:?}", HEALTH_PROBE_TIMEOUT);
                false
            }
        }
    }
}
