//! In-memory reference store
//!
//! Backs the daemon and the test suites. Each entity map sits behind its own
//! `tokio::sync::RwLock`; holding the write lock across the read-check-write
//! is what makes `try_claim`, `debit`, and `replace_all` atomic with respect
//! to overlapping settlement cycles.

use crate::error::{Result, StoreError};
use crate::store::{AccountStore, BankStore, TransactionStore};
use crate::types::{Account, Bank, Transaction, TransactionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory implementation of all store traits
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: RwLock<HashMap<Uuid, Transaction>>,
    accounts: RwLock<HashMap<String, Account>>,
    banks: RwLock<HashMap<String, Bank>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn find_by_status(&self, status: TransactionStatus) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        let mut matching: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|t| t.created_at);
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().await.get(&id).cloned())
    }

    async fn save(&self, transaction: &Transaction) -> Result<()> {
        self.transactions
            .write()
            .await
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn try_claim(&self, id: Uuid) -> Result<Option<Transaction>> {
        let mut transactions = self.transactions.write().await;
        let transaction = transactions
            .get_mut(&id)
            .ok_or(StoreError::TransactionNotFound(id))?;

        if transaction.status != TransactionStatus::Pending {
            return Ok(None);
        }

        transaction.status = TransactionStatus::InProgress;
        transaction.claimed_at = Some(Utc::now());
        Ok(Some(transaction.clone()))
    }

    async fn release_stale_claims(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut transactions = self.transactions.write().await;
        let mut requeued = 0;

        for transaction in transactions.values_mut() {
            if transaction.status != TransactionStatus::InProgress {
                continue;
            }
            // A claim without a timestamp is an anomaly; requeue it too
            if transaction.claimed_at.map_or(true, |at| at < cutoff) {
                debug!("Releasing stale claim on transaction {}", transaction.id);
                transaction.status = TransactionStatus::Pending;
                transaction.claimed_at = None;
                requeued += 1;
            }
        }

        Ok(requeued)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_number(&self, number: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(number).cloned())
    }

    async fn save(&self, account: &Account) -> Result<()> {
        self.accounts
            .write()
            .await
            .insert(account.number.clone(), account.clone());
        Ok(())
    }

    async fn debit(&self, number: &str, amount: Decimal) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(number)
            .ok_or_else(|| StoreError::AccountNotFound(number.to_string()))?;

        if account.balance < amount {
            return Err(StoreError::InsufficientFunds {
                account: number.to_string(),
                balance: account.balance,
                amount,
            });
        }

        account.balance -= amount;
        Ok(account.clone())
    }
}

#[async_trait]
impl BankStore for MemoryStore {
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<Bank>> {
        Ok(self.banks.read().await.get(prefix).cloned())
    }

    async fn replace_all(&self, banks: Vec<Bank>) -> Result<()> {
        // Build the new snapshot first, publish it in one assignment
        let snapshot: HashMap<String, Bank> = banks
            .into_iter()
            .map(|bank| (bank.prefix.clone(), bank))
            .collect();
        *self.banks.write().await = snapshot;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Bank>> {
        Ok(self.banks.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn transaction() -> Transaction {
        Transaction::new(
            "abc00000001",
            "xyz00000042",
            "EUR",
            dec!(150.00),
            "Invoice 42",
            "Mari Maasikas",
        )
    }

    fn account(number: &str, balance: Decimal) -> Account {
        Account {
            number: number.to_string(),
            balance,
            currency: "EUR".to_string(),
            owner: "Mari Maasikas".to_string(),
        }
    }

    fn bank(prefix: &str) -> Bank {
        Bank {
            prefix: prefix.to_string(),
            name: format!("{}Bank", prefix),
            transaction_url: format!("http://{}.example.com/transactions/b2b", prefix),
            owners: "Jane Smith".to_string(),
            jwks_url: format!("http://{}.example.com/jwks.json", prefix),
        }
    }

    #[tokio::test]
    async fn claim_succeeds_exactly_once() {
        let store = MemoryStore::new();
        let tx = transaction();
        TransactionStore::save(&store, &tx).await.unwrap();

        let claimed = store.try_claim(tx.id).await.unwrap();
        assert!(claimed.is_some());
        let claimed = claimed.unwrap();
        assert_eq!(claimed.status, TransactionStatus::InProgress);
        assert!(claimed.claimed_at.is_some());

        // Second claim loses the race
        assert!(store.try_claim(tx.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn claim_refused_for_terminal_states() {
        let store = MemoryStore::new();
        let mut tx = transaction();
        tx.status = TransactionStatus::Completed;
        TransactionStore::save(&store, &tx).await.unwrap();

        assert!(store.try_claim(tx.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn claim_of_unknown_transaction_errors() {
        let store = MemoryStore::new();
        let result = store.try_claim(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn stale_claims_are_requeued() {
        let store = MemoryStore::new();

        let mut stale = transaction();
        stale.status = TransactionStatus::InProgress;
        stale.claimed_at = Some(Utc::now() - Duration::minutes(10));
        TransactionStore::save(&store, &stale).await.unwrap();

        let mut fresh = transaction();
        fresh.status = TransactionStatus::InProgress;
        fresh.claimed_at = Some(Utc::now());
        TransactionStore::save(&store, &fresh).await.unwrap();

        let cutoff = Utc::now() - Duration::minutes(5);
        assert_eq!(store.release_stale_claims(cutoff).await.unwrap(), 1);

        let requeued = store.find_by_id(stale.id).await.unwrap().unwrap();
        assert_eq!(requeued.status, TransactionStatus::Pending);
        assert!(requeued.claimed_at.is_none());

        let untouched = store.find_by_id(fresh.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, TransactionStatus::InProgress);
    }

    #[tokio::test]
    async fn find_by_status_filters_and_orders() {
        let store = MemoryStore::new();

        let mut older = transaction();
        older.created_at = Utc::now() - Duration::hours(2);
        TransactionStore::save(&store, &older).await.unwrap();

        let newer = transaction();
        TransactionStore::save(&store, &newer).await.unwrap();

        let mut done = transaction();
        done.status = TransactionStatus::Completed;
        TransactionStore::save(&store, &done).await.unwrap();

        let pending = store
            .find_by_status(TransactionStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, older.id);
        assert_eq!(pending[1].id, newer.id);
    }

    #[tokio::test]
    async fn debit_reduces_balance() {
        let store = MemoryStore::new();
        AccountStore::save(&store, &account("abc00000001", dec!(1000.00)))
            .await
            .unwrap();

        let updated = store.debit("abc00000001", dec!(150.00)).await.unwrap();
        assert_eq!(updated.balance, dec!(850.00));
    }

    #[tokio::test]
    async fn debit_refuses_to_cross_zero() {
        let store = MemoryStore::new();
        AccountStore::save(&store, &account("abc00000001", dec!(100.00)))
            .await
            .unwrap();

        let result = store.debit("abc00000001", dec!(100.01)).await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientFunds { .. })
        ));

        // Balance untouched by the refused debit
        let account = store.find_by_number("abc00000001").await.unwrap().unwrap();
        assert_eq!(account.balance, dec!(100.00));
    }

    #[tokio::test]
    async fn debit_of_unknown_account_errors() {
        let store = MemoryStore::new();
        let result = store.debit("nope0000001", dec!(1.00)).await;
        assert!(matches!(result, Err(StoreError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn replace_all_swaps_the_whole_set() {
        let store = MemoryStore::new();
        store.replace_all(vec![bank("old")]).await.unwrap();
        assert!(store.find_by_prefix("old").await.unwrap().is_some());

        store
            .replace_all(vec![bank("foo"), bank("bar")])
            .await
            .unwrap();

        // Old entry is gone, not merged
        assert!(store.find_by_prefix("old").await.unwrap().is_none());
        assert!(store.find_by_prefix("foo").await.unwrap().is_some());
        assert!(store.find_by_prefix("bar").await.unwrap().is_some());
        assert_eq!(store.all().await.unwrap().len(), 2);
    }
}
