//! Settlement dispatcher
//!
//! The core state machine. A fixed ticker starts a cycle every
//! `cycle_interval_ms`; each cycle snapshots the pending set and spawns one
//! independent pipeline per transaction. Cycles are not mutually exclusive:
//! the ticker fires whether or not earlier pipelines have finished, so the
//! atomic claim in [`TransactionStore::try_claim`] is what guarantees a
//! transfer is settled at most once.
//!
//! Every failure is handled inside the owning pipeline: a transaction can
//! fail terminally or requeue, but it can never take a sibling or the
//! scheduler down with it.

use crate::config::{Config, DispatcherConfig};
use crate::error::Result;
use crate::metrics;
use crate::signer::TransferSigner;
use adapters::{BankDirectory, DispatchOutcome, RegistryClient, RemoteBankClient};
use chrono::Utc;
use ledger_store::{AccountStore, BankStore, Transaction, TransactionStatus, TransactionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Settlement dispatcher
pub struct Dispatcher {
    /// Transaction persistence
    transactions: Arc<dyn TransactionStore>,

    /// Account persistence (debited on success)
    accounts: Arc<dyn AccountStore>,

    /// Bank directory cache
    directory: Arc<BankDirectory>,

    /// Transfer signer
    signer: Arc<TransferSigner>,

    /// Counterparty client
    bank_client: Arc<RemoteBankClient>,

    /// Timing configuration
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher from pre-built components
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        accounts: Arc<dyn AccountStore>,
        directory: Arc<BankDirectory>,
        signer: Arc<TransferSigner>,
        bank_client: Arc<RemoteBankClient>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            transactions,
            accounts,
            directory,
            signer,
            bank_client,
            config,
        }
    }

    /// Build the full component stack from configuration
    ///
    /// `store` backs transactions, accounts, and the bank directory cache.
    /// Fails fast if the signing key is unusable or an HTTP client cannot
    /// be constructed.
    pub fn from_config<S>(config: &Config, store: Arc<S>) -> Result<Self>
    where
        S: TransactionStore + AccountStore + BankStore + 'static,
    {
        let signer = TransferSigner::from_pem_file(&config.signing.private_key_path)?;
        let registry = RegistryClient::new(
            &config.registry.base_url,
            &config.registry.api_key,
            Duration::from_secs(config.registry.timeout_seconds),
        )?;
        let directory = BankDirectory::new(Arc::clone(&store) as Arc<dyn BankStore>, registry);
        let bank_client =
            RemoteBankClient::new(Duration::from_millis(config.dispatcher.dispatch_timeout_ms))?;

        Ok(Self::new(
            Arc::clone(&store) as Arc<dyn TransactionStore>,
            store as Arc<dyn AccountStore>,
            Arc::new(directory),
            Arc::new(signer),
            Arc::new(bank_client),
            config.dispatcher.clone(),
        ))
    }

    /// Run settlement cycles forever
    pub async fn run(self: Arc<Self>) {
        info!(
            "Starting settlement dispatcher: cycle every {} ms, dispatch deadline {} ms",
            self.config.cycle_interval_ms, self.config.dispatch_timeout_ms
        );

        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.cycle_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // Pipelines are deliberately not awaited: the next cycle starts
            // on schedule and the atomic claim keeps the overlap safe
            let _ = Arc::clone(&self).run_cycle().await;
        }
    }

    /// Run one settlement cycle
    ///
    /// Requeues stale claims, snapshots the pending set, and spawns one
    /// pipeline task per transaction. Returns the spawned handles so tests
    /// can await completion; the production loop drops them.
    pub async fn run_cycle(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        metrics::SETTLEMENT_CYCLES_TOTAL.inc();

        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.claim_lease_seconds as i64);
        match self.transactions.release_stale_claims(cutoff).await {
            Ok(0) => {}
            Ok(requeued) => warn!("Requeued {} stale in-progress transactions", requeued),
            Err(e) => warn!("Could not release stale claims: {}", e),
        }

        let pending = match self
            .transactions
            .find_by_status(TransactionStatus::Pending)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Could not query pending transactions: {}", e);
                return Vec::new();
            }
        };

        if pending.is_empty() {
            return Vec::new();
        }
        debug!("Cycle picked up {} pending transactions", pending.len());

        pending
            .into_iter()
            .map(|transaction| {
                let dispatcher = Arc::clone(&self);
                tokio::spawn(async move { dispatcher.process(transaction).await })
            })
            .collect()
    }

    /// The per-transaction pipeline:
    /// expiry → claim → resolve → sign → dispatch → settle
    async fn process(&self, tx: Transaction) {
        if tx.is_expired(Utc::now(), self.config.expiry_days) {
            info!(
                "Transaction {} exceeded the {}-day settlement window",
                tx.id, self.config.expiry_days
            );
            let mut tx = tx;
            self.record(
                &mut tx,
                TransactionStatus::Failed,
                Some("Timeout reached".to_string()),
                "expired",
            )
            .await;
            return;
        }

        // Claim: the atomic pending → inProgress transition. Losing the
        // race means another cycle's worker owns this transaction.
        let mut tx = match self.transactions.try_claim(tx.id).await {
            Ok(Some(claimed)) => claimed,
            Ok(None) => {
                debug!("Transaction {} already claimed by another worker", tx.id);
                return;
            }
            Err(e) => {
                warn!("Could not claim transaction {}: {}", tx.id, e);
                return;
            }
        };

        let prefix = tx.destination_prefix();
        let bank = match self.directory.lookup(&prefix).await {
            Ok(bank) => bank,
            Err(e) if e.is_transient() => {
                warn!("Registry unavailable while resolving prefix {}: {}", prefix, e);
                self.record(
                    &mut tx,
                    TransactionStatus::Pending,
                    Some(format!("Could not resolve destination bank: {}", e)),
                    "requeued_registry",
                )
                .await;
                return;
            }
            Err(e) => {
                self.record(
                    &mut tx,
                    TransactionStatus::Failed,
                    Some(e.to_string()),
                    "unresolvable",
                )
                .await;
                return;
            }
        };

        let token = match self.signer.sign(&tx) {
            Ok(token) => token,
            Err(e) => {
                // The key was proven usable at startup; reaching this means
                // the process configuration is broken, not the transfer
                error!("Signing failed for transaction {}: {}", tx.id, e);
                self.record(
                    &mut tx,
                    TransactionStatus::Pending,
                    Some(format!("Signing failure: {}", e)),
                    "requeued_signing",
                )
                .await;
                return;
            }
        };

        let timer = metrics::DISPATCH_DURATION.start_timer();
        let outcome = self.bank_client.send(&bank.transaction_url, &token).await;
        timer.observe_duration();

        let response = match outcome {
            DispatchOutcome::Success(response) => response,
            DispatchOutcome::Timeout => {
                self.record(
                    &mut tx,
                    TransactionStatus::Pending,
                    Some("Server is not responding".to_string()),
                    "requeued_timeout",
                )
                .await;
                return;
            }
            DispatchOutcome::NetworkError(message) => {
                self.record(
                    &mut tx,
                    TransactionStatus::Failed,
                    Some(message),
                    "network_error",
                )
                .await;
                return;
            }
            DispatchOutcome::ApplicationError(detail) => {
                self.record(
                    &mut tx,
                    TransactionStatus::Failed,
                    Some(detail),
                    "rejected",
                )
                .await;
                return;
            }
        };

        match self.accounts.debit(&tx.account_from, tx.amount).await {
            Ok(account) => {
                debug!(
                    "Debited {} {} from account {}",
                    tx.amount, tx.currency, account.number
                );
            }
            Err(e) => {
                warn!("Debit refused for transaction {}: {}", tx.id, e);
                self.record(
                    &mut tx,
                    TransactionStatus::Failed,
                    Some(e.to_string()),
                    "debit_refused",
                )
                .await;
                return;
            }
        }

        tx.receiver_name = Some(response.receiver_name);
        info!("Transaction {} completed", tx.id);
        self.record(&mut tx, TransactionStatus::Completed, None, "completed")
            .await;
    }

    /// Persist a state transition and count the outcome
    async fn record(
        &self,
        tx: &mut Transaction,
        status: TransactionStatus,
        detail: Option<String>,
        outcome: &str,
    ) {
        tx.status = status;
        tx.status_detail = detail;
        if status != TransactionStatus::InProgress {
            tx.claimed_at = None;
        }

        metrics::SETTLEMENT_TRANSACTIONS_TOTAL
            .with_label_values(&[outcome])
            .inc();

        if let Err(e) = self.transactions.save(tx).await {
            error!("Could not persist transaction {}: {}", tx.id, e);
        }
    }
}
