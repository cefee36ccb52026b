//! ClearRail ledger store
//!
//! Domain entities and abstract store operations for the settlement engine.
//! The persistence engine's internals are out of scope here: the dispatcher
//! consumes [`TransactionStore`], [`AccountStore`], and [`BankStore`] only,
//! and [`MemoryStore`] is the in-process reference implementation backing the
//! daemon and the test suites.
//!
//! # Invariants
//!
//! - Transaction status only moves `pending → inProgress → {completed,
//!   failed, pending}`; `completed` and `failed` are terminal.
//! - Claims are atomic conditional updates: overlapping settlement cycles
//!   race on [`TransactionStore::try_claim`] and exactly one wins.
//! - Debits are serialized per account and never take a balance below zero.
//! - The bank set is replaced wholesale in one atomic publish; readers never
//!   observe a partially-populated directory.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::{AccountStore, BankStore, TransactionStore};
pub use types::{Account, Bank, Transaction, TransactionStatus};
