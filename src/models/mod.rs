pub mod record;
pub mod token;

pub use record::PairRecord;
pub use token::TokenDescriptor;

use ethers::types::{Address, H256, U256};

/// A single PairCreated log as delivered by the chain event source.
///
/// Immutable once decoded; consumed exactly once by the listener. The hash,
/// index and block fields come straight from the raw log and may be absent on
/// pending or malformed entries — identity derivation rejects those.
#[derive(Debug, Clone)]
pub struct PairCreatedEvent {
    pub token0: Address,
    pub token1: Address,
    pub pair: Address,
    pub tx_hash: Option<H256>,
    pub log_index: Option<U256>,
    pub block_number: Option<u64>,
}
