//! Error types for the store layer

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Debit refused: it would take the balance below zero
    #[error("Insufficient funds on account {account}: balance {balance}, debit {amount}")]
    InsufficientFunds {
        /// Account number
        account: String,
        /// Balance at refusal time
        balance: Decimal,
        /// Requested debit amount
        amount: Decimal,
    },

    /// Backend failure (connection, serialization, ...)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::Storage(msg)
    }
}
