use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairwatchError {
    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
