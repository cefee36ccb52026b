//! Property-based tests for store invariants
//!
//! These tests use proptest to verify the contracts the dispatcher relies on:
//! - Claim-once: a pending transaction is claimable exactly once
//! - Debit floor: no sequence of debits takes a balance below zero
//! - Wholesale swap: a directory refresh never merges old and new entries

use ledger_store::{
    Account, AccountStore, Bank, BankStore, MemoryStore, StoreError, Transaction,
    TransactionStatus, TransactionStore,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Strategy for generating valid amounts (positive decimals)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..1_000_000_00u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Strategy for generating 3-character bank prefixes
fn prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3}"
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

fn transaction(amount: Decimal) -> Transaction {
    Transaction::new(
        "abc00000001",
        "xyz00000042",
        "EUR",
        amount,
        "property test",
        "Mari Maasikas",
    )
}

proptest! {
    /// No sequence of debits ever takes the balance below zero, and every
    /// accepted debit is reflected exactly in the final balance.
    #[test]
    fn debits_never_cross_zero(
        start_cents in 0u64..1_000_000_00u64,
        debits in prop::collection::vec(amount_strategy(), 1..20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::new();
            let start = Decimal::new(start_cents as i64, 2);
            AccountStore::save(&store, &Account {
                    number: "abc00000001".to_string(),
                    balance: start,
                    currency: "EUR".to_string(),
                    owner: "Mari Maasikas".to_string(),
                })
                .await
                .unwrap();

            let mut accepted = Decimal::ZERO;
            for amount in debits {
                match store.debit("abc00000001", amount).await {
                    Ok(_) => accepted += amount,
                    Err(StoreError::InsufficientFunds { balance, .. }) => {
                        // The refusal must report the live balance
                        prop_assert_eq!(balance, start - accepted);
                    }
                    Err(other) => return Err(TestCaseError::fail(other.to_string())),
                }
            }

            let account = store.find_by_number("abc00000001").await.unwrap().unwrap();
            prop_assert_eq!(account.balance, start - accepted);
            prop_assert!(account.balance >= Decimal::ZERO);
            Ok(())
        })?;
    }

    /// However many workers race on a pending transaction, exactly one claim
    /// succeeds.
    #[test]
    fn concurrent_claims_win_exactly_once(
        amount in amount_strategy(),
        workers in 2usize..12,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let tx = transaction(amount);
            TransactionStore::save(&*store, &tx).await.unwrap();

            let mut handles = Vec::new();
            for _ in 0..workers {
                let store = Arc::clone(&store);
                let id = tx.id;
                handles.push(tokio::spawn(async move {
                    store.try_claim(id).await.unwrap().is_some()
                }));
            }

            let mut wins = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    wins += 1;
                }
            }
            prop_assert_eq!(wins, 1);

            let stored = store.find_by_id(tx.id).await.unwrap().unwrap();
            prop_assert_eq!(stored.status, TransactionStatus::InProgress);
            Ok(())
        })?;
    }

    /// After a refresh, only the new bank set is visible, never a merge of
    /// old and new.
    #[test]
    fn refresh_replaces_wholesale(
        old_prefixes in prop::collection::hash_set(prefix_strategy(), 1..8),
        new_prefixes in prop::collection::hash_set(prefix_strategy(), 1..8),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::new();
            store
                .replace_all(old_prefixes.iter().map(|p| bank(p)).collect())
                .await
                .unwrap();
            store
                .replace_all(new_prefixes.iter().map(|p| bank(p)).collect())
                .await
                .unwrap();

            for prefix in &old_prefixes {
                let present = store.find_by_prefix(prefix).await.unwrap().is_some();
                prop_assert_eq!(present, new_prefixes.contains(prefix));
            }
            for prefix in &new_prefixes {
                prop_assert!(store.find_by_prefix(prefix).await.unwrap().is_some());
            }
            prop_assert_eq!(store.all().await.unwrap().len(), new_prefixes.len());
            Ok(())
        })?;
    }
}
