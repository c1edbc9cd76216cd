//! Watched Wallet Addresses
//!
//! Read-mostly set of wallet addresses we care about. Membership tests are
//! case-insensitive by construction: every address is lowercased when it
//! enters the set and every lookup lowercases its argument, so mixed-case
//! (checksummed) addresses from chain data always match.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct WatchedAddresses {
    addresses: HashSet<String>,
}

impl WatchedAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from any address-like strings, normalizing to lowercase.
    pub fn from_iter<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Load the watchlist from a JSON array file (e.g. `data/watchlist.json`).
    /// A missing file yields an empty set rather than an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Watchlist file {} not found, starting with empty watchlist", path.display());
            return Ok(Self::new());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read watchlist file {}", path.display()))?;
        let raw: Vec<String> = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse watchlist file {}", path.display()))?;

        let set = Self::from_iter(raw);
        info!("Loaded {} watched addresses", set.len());
        Ok(set)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(&address.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// All watched addresses (lowercase), for the API surface.
    pub fn as_vec(&self) -> Vec<String> {
        let mut out: Vec<String> = self.addresses.iter().cloned().collect();
        out.sort();
        out
    }
}
