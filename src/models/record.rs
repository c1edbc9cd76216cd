use serde::{Deserialize, Serialize};

use super::TokenDescriptor;

/// Analysis result for one newly created pair.
///
/// Built once per event and committed once to the ledger; a re-observation of
/// the same `(tx_hash, log_index)` is skipped, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRecord {
    /// Target (non-WETH) token address, lowercase hex
    pub address: String,
    /// Pair contract address, lowercase hex
    pub pair_address: String,
    /// Originating transaction hash, lowercase hex
    pub tx_hash: String,
    /// Log position within the transaction
    pub log_index: u64,
    /// Block the creation log was observed in
    pub block_number: Option<u64>,
    /// WETH-side reserve of the pair, in whole ETH
    pub liquidity_eth: f64,
    /// Round-trip simulation flagged the token as a suspected honeypot
    pub honeypot: bool,
    /// Owner is the zero or burn address
    pub ownership_renounced: bool,
    pub token0_info: TokenDescriptor,
    pub token1_info: TokenDescriptor,
    /// Observation time, unix seconds UTC
    pub timestamp: i64,
}

impl PairRecord {
    /// Case-insensitive substring match over the address/name/symbol fields,
    /// mirroring the token_events search filter.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            self.address.as_str(),
            self.token0_info.address.as_str(),
            self.token1_info.address.as_str(),
            self.token0_info.name.as_str(),
            self.token1_info.name.as_str(),
            self.token0_info.symbol.as_str(),
            self.token1_info.symbol.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
