//! In-memory fallback store
//!
//! Used when no store path is configured. Keeps the same trait contract as
//! the durable store — one record per identity, enforced under a single
//! write lock — but only within one process lifetime: nothing survives a
//! restart, and a second process instance gets its own empty ledger. That
//! limitation is accepted for single-process deployments, not hidden.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{finalize, CommitOutcome, EventStore, RecordFilter, Result};
use crate::models::PairRecord;
use crate::pipeline::identity::EventIdentity;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<EventIdentity, PairRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_if_absent(
        &self,
        identity: &EventIdentity,
        record: &PairRecord,
    ) -> Result<CommitOutcome> {
        let mut records = self.records.write().await;
        if records.contains_key(identity) {
            return Ok(CommitOutcome::DuplicateSkipped);
        }
        records.insert(identity.clone(), record.clone());
        Ok(CommitOutcome::Inserted)
    }

    async fn contains(&self, identity: &EventIdentity) -> Result<bool> {
        Ok(self.records.read().await.contains_key(identity))
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<PairRecord>> {
        let records = self.records.read().await;
        let matches = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(finalize(matches, filter.limit))
    }
}
