//! Error types for the settlement engine

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Signing key unusable or token construction failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] ledger_store::StoreError),

    /// Adapter error (registry, directory, or counterparty client)
    #[error("Adapter error: {0}")]
    Adapter(#[from] adapters::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
