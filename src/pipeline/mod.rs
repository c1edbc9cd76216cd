//! Event pipeline
//!
//! `PairListener` is the long-lived poll loop that turns raw factory logs
//! into committed analysis records; `TransferWatcher` is its simpler sibling
//! for watched-wallet token transfers. Identity derivation lives here because
//! it is the pipeline's admission gate.

pub mod identity;
pub mod listener;
pub mod transfer_watcher;

pub use listener::PairListener;
pub use transfer_watcher::TransferWatcher;
