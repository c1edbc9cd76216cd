use ethers::types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub address: String,   // Token contract address (lowercase hex)
    pub name: String,      // Token name
    pub symbol: String,    // Token symbol
    pub decimals: u8,      // Token decimals (usually 18)
}

impl TokenDescriptor {
    /// Sentinel descriptor for contracts that do not answer the ERC-20
    /// metadata calls.
    pub fn unknown(address: Address) -> Self {
        Self {
            address: format!("{:#x}", address),
            name: "Unknown".to_string(),
            symbol: "UNK".to_string(),
            decimals: 18,
        }
    }
}
