use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::env;

// Uniswap V2 mainnet contracts
const DEFAULT_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
const DEFAULT_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
const DEFAULT_WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

const DEFAULT_PAIR_CREATED_SIGNATURE: &str = "PairCreated(address,address,address,uint256)";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub web3_provider: String,
    pub factory_address: Address,
    pub router_address: Address,
    pub weth_address: Address,
    pub pair_created_signature: String,

    pub watchlist_path: String,
    pub store_path: Option<String>, // None selects the in-memory store

    pub api_host: String,
    pub api_port: u16,

    pub poll_interval_ms: u64,
    pub error_backoff_ms: u64,

    pub probe_amount_wei: U256,
    pub honeypot_ratio_threshold: f64,
    pub feed_capacity: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            web3_provider: env::var("WEB3_PROVIDER")
                .context("WEB3_PROVIDER not set in environment")?,
            factory_address: parse_address("FACTORY_ADDRESS", DEFAULT_FACTORY)?,
            router_address: parse_address("ROUTER_ADDRESS", DEFAULT_ROUTER)?,
            weth_address: parse_address("WETH_ADDRESS", DEFAULT_WETH)?,
            pair_created_signature: env::var("PAIR_CREATED_SIGNATURE")
                .unwrap_or_else(|_| DEFAULT_PAIR_CREATED_SIGNATURE.to_string()),

            watchlist_path: env::var("WATCHLIST_PATH")
                .unwrap_or_else(|_| "data/watchlist.json".to_string()),
            store_path: env::var("STORE_PATH").ok(),

            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Failed to parse API_PORT")?,

            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Failed to parse POLL_INTERVAL_MS")?,
            error_backoff_ms: env::var("ERROR_BACKOFF_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Failed to parse ERROR_BACKOFF_MS")?,

            // Probe 0.01 ETH by default
            probe_amount_wei: U256::from_dec_str(
                &env::var("PROBE_AMOUNT_WEI")
                    .unwrap_or_else(|_| "10000000000000000".to_string()),
            )
            .context("Failed to parse PROBE_AMOUNT_WEI")?,
            honeypot_ratio_threshold: env::var("HONEYPOT_RATIO_THRESHOLD")
                .unwrap_or_else(|_| "0.4".to_string())
                .parse()
                .context("Failed to parse HONEYPOT_RATIO_THRESHOLD")?,
            feed_capacity: env::var("FEED_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Failed to parse FEED_CAPACITY")?,
        })
    }
}

fn parse_address(var: &str, default: &str) -> Result<Address> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("Failed to parse {} as an address", var))
}
