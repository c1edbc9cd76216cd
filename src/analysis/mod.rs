//! Pair risk analysis
//!
//! Three independent heuristic checks (liquidity depth, round-trip trade
//! simulation, ownership renouncement) plus ERC-20 metadata resolution,
//! combined per event by `PairAnalyzer`.

pub mod analyzer;
pub mod checks;
pub mod token_info;

pub use analyzer::PairAnalyzer;
