//! Durable ledger on sled
//!
//! Records live in one tree keyed by `txhash:logindex`. The idempotency
//! guarantee comes from `compare_and_swap` with an expected-absent old value:
//! the insert and the uniqueness check are one atomic storage operation, so
//! concurrent writers (or a retried commit) cannot both land.
//!
//! Queries scan the tree and filter in process. Pair creations arrive a few
//! per block at most, so the tree stays small enough that a scan is fine.

use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use super::{finalize, CommitOutcome, EventStore, RecordFilter, Result};
use crate::error::PairwatchError;
use crate::models::PairRecord;
use crate::pipeline::identity::EventIdentity;

const RECORDS_TREE: &str = "pair_records";

pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    /// Open (or create) the store at `path` and purge legacy records before
    /// serving, so pre-identity data cannot shadow the uniqueness key.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .map_err(|e| PairwatchError::StorageError(format!("Failed to open store: {}", e)))?;
        Self::from_db(db)
    }

    /// In-memory sled instance for tests.
    #[cfg(test)]
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| PairwatchError::StorageError(e.to_string()))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let tree = db
            .open_tree(RECORDS_TREE)
            .map_err(|e| PairwatchError::StorageError(format!("Failed to open tree: {}", e)))?;
        let store = Self { tree };
        let purged = store.purge_legacy_records()?;
        if purged > 0 {
            info!("Purged {} legacy record(s) without an event identity", purged);
        }
        Ok(store)
    }

    /// Remove records that predate the identity scheme: payloads that no
    /// longer decode, or that carry an empty identity field. Left in place
    /// they would collide with the first legitimate record under the same
    /// degenerate key.
    fn purge_legacy_records(&self) -> Result<usize> {
        let mut purged = 0usize;
        for entry in self.tree.iter() {
            let (key, value) =
                entry.map_err(|e| PairwatchError::StorageError(e.to_string()))?;
            let legacy = match serde_json::from_slice::<PairRecord>(&value) {
                Ok(record) => record.tx_hash.is_empty(),
                Err(_) => true,
            };
            if legacy {
                self.tree
                    .remove(&key)
                    .map_err(|e| PairwatchError::StorageError(e.to_string()))?;
                purged += 1;
            }
        }
        Ok(purged)
    }

    #[cfg(test)]
    fn insert_raw(&self, key: &[u8], value: &[u8]) {
        self.tree.insert(key, value).unwrap();
    }
}

#[async_trait]
impl EventStore for SledStore {
    async fn insert_if_absent(
        &self,
        identity: &EventIdentity,
        record: &PairRecord,
    ) -> Result<CommitOutcome> {
        let key = identity.storage_key();
        let value = serde_json::to_vec(record)
            .map_err(|e| PairwatchError::StorageError(format!("Failed to encode record: {}", e)))?;

        let outcome = self
            .tree
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))
            .map_err(|e| PairwatchError::StorageError(format!("Conditional insert failed: {}", e)))?;

        match outcome {
            Ok(()) => {
                self.tree
                    .flush_async()
                    .await
                    .map_err(|e| PairwatchError::StorageError(format!("Flush failed: {}", e)))?;
                Ok(CommitOutcome::Inserted)
            }
            Err(_) => Ok(CommitOutcome::DuplicateSkipped),
        }
    }

    async fn contains(&self, identity: &EventIdentity) -> Result<bool> {
        self.tree
            .contains_key(identity.storage_key().as_bytes())
            .map_err(|e| PairwatchError::StorageError(e.to_string()))
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<PairRecord>> {
        let mut matches = Vec::new();
        for entry in self.tree.iter() {
            let (_, value) = entry.map_err(|e| PairwatchError::StorageError(e.to_string()))?;
            let record: PairRecord = match serde_json::from_slice(&value) {
                Ok(record) => record,
                Err(e) => {
                    // Purged at open; anything appearing later is corruption
                    warn!("Skipping undecodable record in store: {}", e);
                    continue;
                }
            };
            if filter.matches(&record) {
                matches.push(record);
            }
        }
        Ok(finalize(matches, filter.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::record;

    fn identity(tx_hash: &str, log_index: u64) -> EventIdentity {
        EventIdentity {
            tx_hash: tx_hash.to_string(),
            log_index,
        }
    }

    #[tokio::test]
    async fn test_double_commit_is_idempotent() {
        let store = SledStore::temporary().unwrap();
        let id = identity("0x11", 3);
        let r = record("0x11", 3);

        let first = store.insert_if_absent(&id, &r).await.unwrap();
        let second = store.insert_if_absent(&id, &r).await.unwrap();

        assert_eq!(first, CommitOutcome::Inserted);
        assert_eq!(second, CommitOutcome::DuplicateSkipped);

        let all = store.query(&RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_same_tx_different_log_index_both_insert() {
        let store = SledStore::temporary().unwrap();
        let r = record("0x11", 0);

        let first = store
            .insert_if_absent(&identity("0x11", 0), &r)
            .await
            .unwrap();
        let second = store
            .insert_if_absent(&identity("0x11", 1), &r)
            .await
            .unwrap();

        assert_eq!(first, CommitOutcome::Inserted);
        assert_eq!(second, CommitOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_contains() {
        let store = SledStore::temporary().unwrap();
        let id = identity("0x11", 0);

        assert!(!store.contains(&id).await.unwrap());
        store
            .insert_if_absent(&id, &record("0x11", 0))
            .await
            .unwrap();
        assert!(store.contains(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_removes_legacy_records() {
        let store = SledStore::temporary().unwrap();

        // Pre-identity leftovers: junk bytes and a record with an empty hash
        store.insert_raw(b"junk", b"{\"not\":\"a record\"}");
        let mut legacy = record("", 0);
        legacy.tx_hash = String::new();
        store.insert_raw(b"legacy", &serde_json::to_vec(&legacy).unwrap());

        let good_id = identity("0x11", 0);
        store
            .insert_if_absent(&good_id, &record("0x11", 0))
            .await
            .unwrap();

        let purged = store.purge_legacy_records().unwrap();
        assert_eq!(purged, 2);

        let all = store.query(&RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].tx_hash, "0x11");
    }

    #[tokio::test]
    async fn test_query_filters_and_limits() {
        let store = SledStore::temporary().unwrap();
        for i in 0..5u64 {
            let mut r = record("0x11", i);
            r.timestamp = 1_700_000_000 + i as i64;
            r.honeypot = i % 2 == 0;
            store
                .insert_if_absent(&identity("0x11", i), &r)
                .await
                .unwrap();
        }

        let honeypots = store
            .query(&RecordFilter {
                honeypot: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(honeypots.len(), 3);

        let capped = store
            .query(&RecordFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(capped.len(), 2);
        // Most recent first
        assert!(capped[0].timestamp > capped[1].timestamp);
    }
}
