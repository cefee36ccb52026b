//! Abstract store operations consumed by the settlement engine
//!
//! The persistence engine itself is an external collaborator; the dispatcher
//! only ever sees these traits. Contracts that matter for correctness:
//!
//! - [`TransactionStore::try_claim`] is an atomic conditional update.
//!   Overlapping settlement cycles race on it and exactly one may win; a
//!   lost race means another worker owns the transaction.
//! - [`AccountStore::debit`] serializes concurrent debits to the same
//!   account and refuses to take a balance below zero.
//! - [`BankStore::replace_all`] publishes the new bank set in one step so
//!   readers never observe an empty or partially-populated directory.

use crate::error::Result;
use crate::types::{Account, Bank, Transaction, TransactionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Transaction persistence operations
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All transactions currently in `status` (point-in-time snapshot)
    async fn find_by_status(&self, status: TransactionStatus) -> Result<Vec<Transaction>>;

    /// Look up a single transaction by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>>;

    /// Persist the given transaction state
    async fn save(&self, transaction: &Transaction) -> Result<()>;

    /// Atomically transition `pending → inProgress`, stamping `claimed_at`
    ///
    /// Returns the claimed row, or `None` if the stored status was no longer
    /// `pending`, meaning another worker already owns the transaction and
    /// the caller must skip it.
    async fn try_claim(&self, id: Uuid) -> Result<Option<Transaction>>;

    /// Return `inProgress` transactions claimed before `cutoff` to `pending`
    ///
    /// A claim older than the lease window belongs to a worker that died
    /// mid-pipeline. Returns how many transactions were requeued.
    async fn release_stale_claims(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// Account persistence operations
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by number
    async fn find_by_number(&self, number: &str) -> Result<Option<Account>>;

    /// Persist the given account state
    async fn save(&self, account: &Account) -> Result<()>;

    /// Atomically debit `amount` from the account
    ///
    /// Serialized per account; refuses with
    /// [`StoreError::InsufficientFunds`](crate::StoreError::InsufficientFunds)
    /// rather than crossing zero. Returns the account state after the debit.
    async fn debit(&self, number: &str, amount: Decimal) -> Result<Account>;
}

/// Bank directory persistence operations
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Look up a bank by its 3-character prefix
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<Bank>>;

    /// Replace the entire bank set in one atomic publish
    async fn replace_all(&self, banks: Vec<Bank>) -> Result<()>;

    /// Snapshot of all cached banks
    async fn all(&self) -> Result<Vec<Bank>>;
}
