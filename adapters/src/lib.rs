//! # ClearRail Adapters
//!
//! Outbound connectivity for the settlement engine:
//! - Central registry client (authoritative bank list)
//! - Bank directory cache with atomic snapshot swap
//! - Counterparty bank client with a hard dispatch deadline
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            Settlement Dispatcher             │
//! └───────────┬─────────────────────┬────────────┘
//!             │                     │
//!   ┌─────────▼─────────┐  ┌────────▼──────────┐
//!   │   BankDirectory   │  │  RemoteBankClient │
//!   │ (cache + lookup)  │  │ (deadline-bound)  │
//!   └─────────┬─────────┘  └───────────────────┘
//!             │
//!   ┌─────────▼─────────┐
//!   │  RegistryClient   │
//!   │   (GET /banks)    │
//!   └───────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod bank_client;
pub mod directory;
pub mod error;
pub mod registry;

pub use bank_client::{DispatchOutcome, RemoteBankClient, SettlementResponse};
pub use directory::BankDirectory;
pub use error::{Error, Result};
pub use registry::RegistryClient;

/// Default hard deadline for an outbound settlement call (milliseconds)
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 2000;

/// Default timeout for a registry fetch (seconds)
pub const DEFAULT_REGISTRY_TIMEOUT_SECONDS: u64 = 5;
