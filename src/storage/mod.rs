//! Dedup ledger and record store
//!
//! The store's single job beyond retrieval is the idempotency contract:
//! at most one durably committed record per `(tx_hash, log_index)`, however
//! many times the same chain log is delivered. `insert_if_absent` must be
//! atomic in the storage layer itself — a check-then-insert in process memory
//! would race against a second listener instance or a re-subscription.
//!
//! Two strategies implement the same trait and the orchestrator is handed one
//! of them at startup: `SledStore` (durable, uniqueness via compare-and-swap)
//! or `MemoryStore` (single-process fallback, does not survive restarts).

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use async_trait::async_trait;

use crate::error::PairwatchError;
use crate::models::PairRecord;
use crate::pipeline::identity::EventIdentity;

pub type Result<T> = std::result::Result<T, PairwatchError>;

/// Outcome of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Inserted,
    /// A record under this identity already exists; expected under
    /// at-least-once delivery, never an error.
    DuplicateSkipped,
}

/// Query over the recorded pairs, applied identically by every backend.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Inclusive lower bound, unix seconds
    pub since: Option<i64>,
    /// Inclusive upper bound, unix seconds
    pub until: Option<i64>,
    /// Case-insensitive substring over address/name/symbol fields
    pub text: Option<String>,
    pub honeypot: Option<bool>,
    pub ownership_renounced: Option<bool>,
    pub min_liquidity: Option<f64>,
    /// Result-count cap; `None` means unbounded
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn matches(&self, record: &PairRecord) -> bool {
        if let Some(since) = self.since {
            if record.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp > until {
                return false;
            }
        }
        if let Some(honeypot) = self.honeypot {
            if record.honeypot != honeypot {
                return false;
            }
        }
        if let Some(renounced) = self.ownership_renounced {
            if record.ownership_renounced != renounced {
                return false;
            }
        }
        if let Some(min_liquidity) = self.min_liquidity {
            if record.liquidity_eth < min_liquidity {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !record.matches_text(text) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Atomic conditional insert keyed on the event identity.
    async fn insert_if_absent(
        &self,
        identity: &EventIdentity,
        record: &PairRecord,
    ) -> Result<CommitOutcome>;

    /// Cheap pre-check; the commit above remains the authoritative gate.
    async fn contains(&self, identity: &EventIdentity) -> Result<bool>;

    /// Matching records, most recent first, capped by the filter's limit.
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<PairRecord>>;
}

/// Shared sort-and-cap step for query implementations.
pub(crate) fn finalize(mut records: Vec<PairRecord>, limit: Option<usize>) -> Vec<PairRecord> {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{PairRecord, TokenDescriptor};
    use ethers::types::Address;

    pub fn record(tx_hash: &str, log_index: u64) -> PairRecord {
        PairRecord {
            address: "0x00000000000000000000000000000000000000aa".to_string(),
            pair_address: "0x00000000000000000000000000000000000000b0".to_string(),
            tx_hash: tx_hash.to_string(),
            log_index,
            block_number: Some(42),
            liquidity_eth: 12.5,
            honeypot: false,
            ownership_renounced: true,
            token0_info: TokenDescriptor::unknown(Address::from([0x01; 20])),
            token1_info: TokenDescriptor::unknown(Address::from([0xaa; 20])),
            timestamp: 1_700_000_000,
        }
    }
}
