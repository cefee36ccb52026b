//! Error types for adapters

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
#[derive(Error, Debug)]
pub enum Error {
    /// No bank is known for the given prefix, even after a registry refresh.
    /// Terminal for the transaction being settled.
    #[error("There is no bank with prefix {prefix}")]
    UnknownBankPrefix {
        /// The unresolved 3-character prefix
        prefix: String,
    },

    /// The central registry could not be reached
    #[error("Central registry unreachable: {0}")]
    RegistryUnreachable(String),

    /// The central registry answered with a non-success status
    #[error("Central registry returned status {status}: {body}")]
    RegistryStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The registry response body could not be decoded as a bank list
    #[error("Malformed registry response: {0}")]
    RegistryMalformed(String),

    /// HTTP client construction or transport error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store error from the directory's backing bank store
    #[error("Store error: {0}")]
    Store(#[from] ledger_store::StoreError),
}

impl Error {
    /// Whether the failure is worth retrying on a later cycle
    ///
    /// Only an unresolvable bank prefix is terminal; registry and store
    /// trouble is assumed to pass.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::UnknownBankPrefix { .. })
    }
}
