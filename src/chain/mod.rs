//! Chain connectivity
//!
//! Everything upstream of the pipeline talks to the chain through the two
//! traits below, so the risk checks and the listener can be exercised against
//! hand-rolled mocks in tests. `EvmClient` is the production implementation
//! over an ethers provider.

pub mod client;
pub mod source;

use async_trait::async_trait;
use ethers::types::{Address, Log, H256, U256};

use crate::error::PairwatchError;

pub type Result<T> = std::result::Result<T, PairwatchError>;

/// Read-only contract access used by the risk checks and metadata lookups.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute an `eth_call` against `to` with the given calldata.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Originating account of a transaction, if the node knows it.
    async fn transaction_sender(&self, tx_hash: H256) -> Result<Option<Address>>;
}

/// Provider-side log filter management with poll-for-new-entries semantics.
#[async_trait]
pub trait LogPoller: Send + Sync {
    /// Install a log filter scoped to one contract address and one topic.
    /// Returns the provider-assigned filter id.
    async fn install_filter(&self, address: Address, topic: H256) -> Result<U256>;

    /// Entries accumulated on the filter since the previous poll.
    async fn poll_filter(&self, filter_id: U256) -> Result<Vec<Log>>;

    /// Bounded connection-health probe. `false` means the caller should
    /// reconnect rather than keep polling a dead transport.
    async fn is_alive(&self) -> bool;
}

/// Provider-side filter evictions surface as a "filter not found" RPC error;
/// those want a fresh filter, not a backoff.
pub fn is_filter_not_found(err: &PairwatchError) -> bool {
    err.to_string().to_lowercase().contains("filter not found")
}
