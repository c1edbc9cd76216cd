//! Pair analysis orchestration

use chrono::Utc;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::info;

use super::checks::{self, fail_safe};
use super::token_info::resolve_token;
use crate::chain::ChainReader;
use crate::models::{PairCreatedEvent, PairRecord};
use crate::pipeline::identity::EventIdentity;

/// Runs the risk check set against one pair creation event and assembles the
/// result record.
///
/// Stateless across events: all per-event state is local to one `analyze`
/// call. Individual check failures never abort an analysis — each check falls
/// back to its documented conservative default and the record is still built.
pub struct PairAnalyzer {
    chain: Arc<dyn ChainReader>,
    weth: Address,
    router: Address,
    probe_amount_wei: U256,
    honeypot_ratio_threshold: f64,
}

impl PairAnalyzer {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        weth: Address,
        router: Address,
        probe_amount_wei: U256,
        honeypot_ratio_threshold: f64,
    ) -> Self {
        Self {
            chain,
            weth,
            router,
            probe_amount_wei,
            honeypot_ratio_threshold,
        }
    }

    /// The token the checks target: the non-WETH side when exactly one side
    /// is WETH, otherwise token0. Pairs without a WETH side still get a
    /// best-effort record rather than being dropped.
    pub fn target_token(&self, token0: Address, token1: Address) -> Address {
        if token0 == self.weth {
            token1
        } else {
            token0
        }
    }

    pub async fn analyze(&self, event: &PairCreatedEvent, identity: &EventIdentity) -> PairRecord {
        let target = self.target_token(event.token0, event.token1);
        let chain = self.chain.as_ref();

        // The three checks are independent and order-insensitive; run them
        // alongside the metadata reads.
        let (liquidity, honeypot, renounced, token0_info, token1_info) = tokio::join!(
            checks::liquidity_in_base(chain, event.pair, event.token0, event.token1, self.weth),
            checks::simulate_round_trip(
                chain,
                target,
                self.router,
                self.weth,
                self.probe_amount_wei,
                self.honeypot_ratio_threshold,
            ),
            checks::ownership_renounced(chain, target),
            resolve_token(chain, event.token0),
            resolve_token(chain, event.token1),
        );

        let liquidity_eth = fail_safe("Liquidity", 0.0, liquidity);
        let honeypot = fail_safe("Honeypot", true, honeypot);
        let ownership_renounced = fail_safe("Ownership", false, renounced);

        info!(
            "Analyzed pair {:#x}: target={:#x} liquidity={:.4} ETH honeypot={} renounced={}",
            event.pair, target, liquidity_eth, honeypot, ownership_renounced
        );

        PairRecord {
            address: format!("{:#x}", target),
            pair_address: format!("{:#x}", event.pair),
            tx_hash: identity.tx_hash.clone(),
            log_index: identity.log_index,
            block_number: event.block_number,
            liquidity_eth,
            honeypot,
            ownership_renounced,
            token0_info,
            token1_info,
            timestamp: Utc::now().timestamp(),
        }
    }
}
