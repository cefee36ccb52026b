//! Bank directory cache
//!
//! Read-mostly mirror of the central registry, keyed by bank prefix. A
//! refresh builds the complete new set and publishes it through
//! [`BankStore::replace_all`] in one step, so concurrent lookups never see
//! an empty or half-populated directory.

use crate::error::{Error, Result};
use crate::registry::RegistryClient;
use ledger_store::{Bank, BankStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Prefix-keyed directory of counterparty banks
pub struct BankDirectory {
    store: Arc<dyn BankStore>,
    registry: RegistryClient,
    /// Single-flight guard: concurrent misses coalesce into one refresh
    refresh_lock: Mutex<()>,
}

impl BankDirectory {
    /// Create a directory over the given bank store and registry client
    pub fn new(store: Arc<dyn BankStore>, registry: RegistryClient) -> Self {
        Self {
            store,
            registry,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Resolve a bank by prefix, refreshing from the registry on a miss
    ///
    /// A miss triggers at most one refresh, after which the lookup is
    /// retried once. A second miss is
    /// [`Error::UnknownBankPrefix`], terminal for the caller. A refresh
    /// failure is a registry error, which the caller treats as transient.
    pub async fn lookup(&self, prefix: &str) -> Result<Bank> {
        if let Some(bank) = self.store.find_by_prefix(prefix).await? {
            return Ok(bank);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the guard
        if let Some(bank) = self.store.find_by_prefix(prefix).await? {
            return Ok(bank);
        }

        self.refresh().await?;

        match self.store.find_by_prefix(prefix).await? {
            Some(bank) => Ok(bank),
            None => Err(Error::UnknownBankPrefix {
                prefix: prefix.to_string(),
            }),
        }
    }

    /// Fetch the full bank list and atomically swap the cached set
    pub async fn refresh(&self) -> Result<()> {
        info!("Refreshing bank directory from the central registry");
        let banks = self.registry.fetch_banks().await?;
        let count = banks.len();
        self.store.replace_all(banks).await?;
        info!("Bank directory refreshed: {} banks", count);
        Ok(())
    }
}
