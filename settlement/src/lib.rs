//! ClearRail Settlement Engine
//!
//! Drains the queue of pending interbank transfers and settles each one
//! against its destination bank:
//!
//! 1. **Pickup**: each cycle snapshots the pending set from the store
//! 2. **Claim**: an atomic conditional update grants one worker ownership
//! 3. **Resolve**: the destination bank is found via the directory cache,
//!    refreshed from the central registry on a miss
//! 4. **Sign**: the transfer payload becomes a compact RS256 token
//! 5. **Dispatch**: the token is posted under a hard deadline
//! 6. **Settle**: the source account is debited and the outcome recorded
//!
//! Cycles run on a fixed ticker and may overlap; the atomic claim is what
//! guarantees a transfer is settled at most once.
//!
//! # Example
//!
//! ```no_run
//! use settlement::{Config, Dispatcher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let store = Arc::new(ledger_store::MemoryStore::new());
//!     let dispatcher = Arc::new(Dispatcher::from_config(&config, store)?);
//!     dispatcher.run().await;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod signer;

// Re-exports
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use signer::{verify_token, TransferClaims, TransferSigner};
