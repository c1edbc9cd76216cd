//! Risk check set
//!
//! Each check reads the chain through `ChainReader` and returns a plain
//! `Result`; it does not decide what a failure means. The orchestrator maps
//! failures to each check's documented fail-safe default through `fail_safe`,
//! so all three are handled uniformly. The defaults are conservative because
//! these results gate a "proceed with trade" signal: an unreadable pair has
//! no liquidity, an unsimulatable token is a suspected honeypot, an
//! unreadable owner is still in control.

use ethers::abi::{AbiParser, Token};
use ethers::types::{Address, U256};
use tracing::{debug, warn};

use crate::chain::{ChainReader, Result};
use crate::error::PairwatchError;

/// Reserves and trade amounts are decoded with 18-decimal fixed-point scaling.
const WEI_PER_ETH: f64 = 1e18;

/// Lossy widening of a U256 for ratio arithmetic.
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

/// Apply a check's fail-safe default, logging the failure it papers over.
pub fn fail_safe<T>(check: &str, default: T, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} check failed: {} (using fail-safe default)", check, e);
            default
        }
    }
}

fn decode_error(what: &str) -> PairwatchError {
    PairwatchError::DecodeError(format!("Unexpected {} output", what))
}

/// WETH-side liquidity of a pair, in whole ETH.
///
/// Reads `getReserves()` and returns whichever reserve slot corresponds to
/// the base currency; 0.0 when neither side is WETH.
pub async fn liquidity_in_base(
    chain: &dyn ChainReader,
    pair: Address,
    token0: Address,
    token1: Address,
    weth: Address,
) -> Result<f64> {
    let function = AbiParser::default()
        .parse_function("getReserves() view returns (uint112,uint112,uint32)")
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let calldata = function
        .encode_input(&[])
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;

    let output = chain.call(pair, calldata).await?;
    let tokens = function
        .decode_output(&output)
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;

    let reserve0 = tokens
        .first()
        .and_then(|t| t.clone().into_uint())
        .ok_or_else(|| decode_error("getReserves"))?;
    let reserve1 = tokens
        .get(1)
        .and_then(|t| t.clone().into_uint())
        .ok_or_else(|| decode_error("getReserves"))?;

    let reserve0_eth = u256_to_f64(reserve0) / WEI_PER_ETH;
    let reserve1_eth = u256_to_f64(reserve1) / WEI_PER_ETH;

    let weth_reserve = if token0 == weth {
        reserve0_eth
    } else if token1 == weth {
        reserve1_eth
    } else {
        0.0
    };
    debug!(
        "Pair {:#x} reserves: {:.4} / {:.4}, WETH side: {:.4}",
        pair, reserve0_eth, reserve1_eth, weth_reserve
    );
    Ok(weth_reserve)
}

/// Round-trip tradability simulation ("honeypot" heuristic).
///
/// Quotes buying the token with a small WETH probe amount, then quotes
/// selling the proceeds straight back. Losing more than `1 - threshold` of
/// the probe on the round trip flags the token; the comparison is a strict
/// `ratio < threshold`.
pub async fn simulate_round_trip(
    chain: &dyn ChainReader,
    token: Address,
    router: Address,
    weth: Address,
    probe_amount_wei: U256,
    ratio_threshold: f64,
) -> Result<bool> {
    if probe_amount_wei.is_zero() {
        return Err(PairwatchError::ConfigError(
            "Probe amount must be positive".to_string(),
        ));
    }

    let function = AbiParser::default()
        .parse_function("getAmountsOut(uint256,address[]) view returns (uint256[])")
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;

    let quote = |amount_in: U256, path: Vec<Address>| {
        let function = function.clone();
        async move {
            let calldata = function
                .encode_input(&[
                    Token::Uint(amount_in),
                    Token::Array(path.into_iter().map(Token::Address).collect()),
                ])
                .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
            let output = chain.call(router, calldata).await?;
            let tokens = function
                .decode_output(&output)
                .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
            let amounts = match tokens.into_iter().next() {
                Some(Token::Array(amounts)) => amounts,
                _ => return Err(decode_error("getAmountsOut")),
            };
            amounts
                .last()
                .and_then(|t| t.clone().into_uint())
                .ok_or_else(|| decode_error("getAmountsOut"))
        }
    };

    let token_out = quote(probe_amount_wei, vec![weth, token]).await?;
    let weth_back = quote(token_out, vec![token, weth]).await?;

    let ratio = u256_to_f64(weth_back) / u256_to_f64(probe_amount_wei);
    debug!("Simulated buy/sell ratio for {:#x}: {:.2}x", token, ratio);

    Ok(ratio < ratio_threshold)
}

/// Well-known burn address accepted as a renounced owner.
fn burn_address() -> Address {
    let mut bytes = [0u8; 20];
    bytes[18] = 0xde;
    bytes[19] = 0xad;
    Address::from(bytes)
}

/// True iff the token's declared `owner()` is the zero or burn address.
pub async fn ownership_renounced(chain: &dyn ChainReader, token: Address) -> Result<bool> {
    let function = AbiParser::default()
        .parse_function("owner() view returns (address)")
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let calldata = function
        .encode_input(&[])
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;

    let output = chain.call(token, calldata).await?;
    let tokens = function
        .decode_output(&output)
        .map_err(|e| PairwatchError::DecodeError(e.to_string()))?;
    let owner = tokens
        .into_iter()
        .next()
        .and_then(|t| t.into_address())
        .ok_or_else(|| decode_error("owner"))?;

    let renounced = owner == Address::zero() || owner == burn_address();
    if !renounced {
        debug!("Ownership of {:#x} still active, owner is {:#x}", token, owner);
    }
    Ok(renounced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::abi::encode;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    /// Pops one canned output per call, in order.
    struct ScriptedReader {
        outputs: tokio::sync::Mutex<Vec<Result<Vec<u8>>>>,
    }

    impl ScriptedReader {
        fn new(outputs: Vec<Result<Vec<u8>>>) -> Self {
            Self {
                outputs: tokio::sync::Mutex::new(outputs),
            }
        }

        fn failing() -> Self {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl ChainReader for ScriptedReader {
        async fn call(&self, _to: Address, _data: Vec<u8>) -> Result<Vec<u8>> {
            let mut outputs = self.outputs.lock().await;
            if outputs.is_empty() {
                Err(PairwatchError::ChainError("no response scripted".to_string()))
            } else {
                outputs.remove(0)
            }
        }

        async fn transaction_sender(
            &self,
            _tx_hash: ethers::types::H256,
        ) -> Result<Option<Address>> {
            Ok(None)
        }
    }

    fn reserves_output(reserve0: u128, reserve1: u128) -> Vec<u8> {
        encode(&[
            Token::Uint(U256::from(reserve0)),
            Token::Uint(U256::from(reserve1)),
            Token::Uint(U256::zero()),
        ])
    }

    fn amounts_output(amounts: &[u128]) -> Vec<u8> {
        encode(&[Token::Array(
            amounts.iter().map(|a| Token::Uint(U256::from(*a))).collect(),
        )])
    }

    fn owner_output(owner: Address) -> Vec<u8> {
        encode(&[Token::Address(owner)])
    }

    const PROBE: u128 = 10_000_000_000_000_000; // 0.01 ETH

    #[tokio::test]
    async fn test_liquidity_returns_weth_side() {
        let weth = addr(0xee);
        let other = addr(0xaa);
        // 12.5 ETH on the token0 side
        let reader = ScriptedReader::new(vec![Ok(reserves_output(
            12_500_000_000_000_000_000,
            999,
        ))]);

        let liq = liquidity_in_base(&reader, addr(0x01), weth, other, weth)
            .await
            .unwrap();
        assert_eq!(liq, 12.5);
    }

    #[tokio::test]
    async fn test_liquidity_zero_when_neither_side_is_weth() {
        let reader = ScriptedReader::new(vec![Ok(reserves_output(
            5_000_000_000_000_000_000,
            7_000_000_000_000_000_000,
        ))]);

        let liq = liquidity_in_base(&reader, addr(0x01), addr(0xaa), addr(0xbb), addr(0xee))
            .await
            .unwrap();
        assert_eq!(liq, 0.0);
    }

    #[tokio::test]
    async fn test_liquidity_fail_safe_default_is_zero() {
        let reader = ScriptedReader::failing();
        let result =
            liquidity_in_base(&reader, addr(0x01), addr(0xaa), addr(0xbb), addr(0xee)).await;
        assert!(result.is_err());
        assert_eq!(fail_safe("Liquidity", 0.0, result), 0.0);
    }

    #[tokio::test]
    async fn test_round_trip_at_threshold_is_not_honeypot() {
        // Selling back returns exactly 0.4x the probe: strict < means no flag
        let reader = ScriptedReader::new(vec![
            Ok(amounts_output(&[PROBE, 1_000_000])),
            Ok(amounts_output(&[1_000_000, PROBE * 4 / 10])),
        ]);

        let honeypot = simulate_round_trip(
            &reader,
            addr(0xaa),
            addr(0x77),
            addr(0xee),
            U256::from(PROBE),
            0.4,
        )
        .await
        .unwrap();
        assert!(!honeypot);
    }

    #[tokio::test]
    async fn test_round_trip_below_threshold_is_honeypot() {
        // 0.39999x of the probe comes back
        let weth_back = 3_999_900_000_000_000;
        let reader = ScriptedReader::new(vec![
            Ok(amounts_output(&[PROBE, 1_000_000])),
            Ok(amounts_output(&[1_000_000, weth_back])),
        ]);

        let honeypot = simulate_round_trip(
            &reader,
            addr(0xaa),
            addr(0x77),
            addr(0xee),
            U256::from(PROBE),
            0.4,
        )
        .await
        .unwrap();
        assert!(honeypot);
    }

    #[tokio::test]
    async fn test_round_trip_fail_safe_default_is_honeypot() {
        let reader = ScriptedReader::failing();
        let result = simulate_round_trip(
            &reader,
            addr(0xaa),
            addr(0x77),
            addr(0xee),
            U256::from(PROBE),
            0.4,
        )
        .await;
        assert!(result.is_err());
        assert!(fail_safe("Honeypot", true, result));
    }

    #[tokio::test]
    async fn test_ownership_renounced_for_zero_and_burn() {
        for owner in [Address::zero(), burn_address()] {
            let reader = ScriptedReader::new(vec![Ok(owner_output(owner))]);
            assert!(ownership_renounced(&reader, addr(0xaa)).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_ownership_active_owner() {
        let reader = ScriptedReader::new(vec![Ok(owner_output(addr(0x42)))]);
        assert!(!ownership_renounced(&reader, addr(0xaa)).await.unwrap());
    }

    #[tokio::test]
    async fn test_ownership_fail_safe_default_is_false() {
        let reader = ScriptedReader::failing();
        let result = ownership_renounced(&reader, addr(0xaa)).await;
        assert!(result.is_err());
        assert!(!fail_safe("Ownership", false, result));
    }
}
