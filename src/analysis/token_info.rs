//! ERC-20 metadata resolution

use ethers::abi::AbiParser;
use ethers::types::Address;
use tracing::debug;

use crate::chain::{ChainReader, Result};
use crate::error::PairwatchError;
use crate::models::TokenDescriptor;

/// Resolve a token's name/symbol/decimals, falling back to the
/// `Unknown`/`UNK`/18 sentinel when the contract does not answer the
/// expected read interface. Descriptors are immutable once resolved.
pub async fn resolve_token(chain: &dyn ChainReader, token: Address) -> TokenDescriptor {
    match read_metadata(chain, token).await {
        Ok((name, symbol, decimals)) => TokenDescriptor {
            address: format!("{:#x}", token),
            name,
            symbol,
            decimals,
        },
        Err(e) => {
            debug!("Metadata read failed for {:#x}: {}", token, e);
            TokenDescriptor::unknown(token)
        }
    }
}

async fn read_metadata(chain: &dyn ChainReader, token: Address) -> Result<(String, String, u8)> {
    let name = read_string(chain, token, "name() view returns (string)").await?;
    let symbol = read_string(chain, token, "symbol() view returns (string)").await?;
    let decimals = read_decimals(chain, token).await?;
    Ok((name, symbol, decimals))
}

async fn read_string(chain: &dyn ChainReader, token: Address, signature: &str) -> Result<String> {
    let function = AbiParser::default()
        .parse_function(signature)
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let calldata = function
        .encode_input(&[])
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let output = chain.call(token, calldata).await?;
    function
        .decode_output(&output)
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?
        .into_iter()
        .next()
        .and_then(|t| t.into_string())
        .ok_or_else(|| PairwatchError::DecodeError(format!("Unexpected output for {}", signature)))
}

async fn read_decimals(chain: &dyn ChainReader, token: Address) -> Result<u8> {
    let function = AbiParser::default()
        .parse_function("decimals() view returns (uint8)")
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let calldata = function
        .encode_input(&[])
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let output = chain.call(token, calldata).await?;
    let value = function
        .decode_output(&output)
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?
        .into_iter()
        .next()
        .and_then(|t| t.into_uint())
        .ok_or_else(|| PairwatchError::DecodeError("Unexpected decimals output".to_string()))?;
    Ok(value.low_u32().min(u8::MAX as u32) as u8)
}
