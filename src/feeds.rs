//! Append-only status and alert feeds
//!
//! The dashboards and the REST API read progress as human-readable lines, not
//! structured events. Each feed is an explicitly owned ring buffer handed to
//! whoever needs to write to it; when the capacity is reached the oldest
//! lines are evicted.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of lines kept per feed
const DEFAULT_FEED_CAPACITY: usize = 1_000;

/// Bounded append-only feed of human-readable messages.
#[derive(Clone)]
pub struct EventFeed {
    name: &'static str,
    entries: Arc<RwLock<VecDeque<String>>>,
    capacity: usize,
}

impl EventFeed {
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, evicting the oldest one when the feed is full.
    pub async fn push(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("[{}] {}", self.name, message);
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(message);
    }

    /// Most recent line, if any.
    pub async fn last(&self) -> Option<String> {
        self.entries.read().await.back().cloned()
    }

    /// Snapshot of the whole feed in append order.
    pub async fn snapshot(&self) -> Vec<String> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
