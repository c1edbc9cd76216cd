//! Chain event identity
//!
//! Every persisted record is keyed by `(tx_hash, log_index)`. A chain log can
//! be redelivered after a reconnect or a provider quirk, so this pair is the
//! dedup key; an event missing either field is rejected outright rather than
//! persisted under a null key.

use ethers::types::H256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PairCreatedEvent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("event has no transaction hash")]
    MissingTxHash,

    #[error("event has no log index")]
    MissingLogIndex,
}

/// Stable unique key of one chain log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventIdentity {
    /// Lowercase 0x-prefixed transaction hash
    pub tx_hash: String,
    /// Log position within the transaction
    pub log_index: u64,
}

impl EventIdentity {
    pub fn derive(event: &PairCreatedEvent) -> Result<Self, IdentityError> {
        let tx_hash = event.tx_hash.ok_or(IdentityError::MissingTxHash)?;
        let log_index = event.log_index.ok_or(IdentityError::MissingLogIndex)?;
        Ok(Self {
            tx_hash: render_tx_hash(tx_hash),
            log_index: log_index.low_u64(),
        })
    }

    /// Ledger key. The zero-padded index keeps keys for one transaction
    /// adjacent and fixed-width.
    pub fn storage_key(&self) -> String {
        format!("{}:{:010}", self.tx_hash, self.log_index)
    }
}

fn render_tx_hash(hash: H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, U256};

    fn event(tx_hash: Option<H256>, log_index: Option<U256>) -> PairCreatedEvent {
        PairCreatedEvent {
            token0: Address::from([0x01; 20]),
            token1: Address::from([0x02; 20]),
            pair: Address::from([0x03; 20]),
            tx_hash,
            log_index,
            block_number: Some(1),
        }
    }

    #[test]
    fn test_derive_renders_stable_hex() {
        let identity =
            EventIdentity::derive(&event(Some(H256::from([0xab; 32])), Some(U256::from(7))))
                .unwrap();
        assert_eq!(identity.tx_hash, format!("0x{}", "ab".repeat(32)));
        assert_eq!(identity.log_index, 7);
        assert!(identity.storage_key().ends_with(":0000000007"));
    }

    #[test]
    fn test_missing_tx_hash_rejected() {
        let err = EventIdentity::derive(&event(None, Some(U256::from(7)))).unwrap_err();
        assert_eq!(err, IdentityError::MissingTxHash);
    }

    #[test]
    fn test_missing_log_index_rejected() {
        let err = EventIdentity::derive(&event(Some(H256::zero()), None)).unwrap_err();
        assert_eq!(err, IdentityError::MissingLogIndex);
    }
}
