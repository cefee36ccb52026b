//! Core entities for the settlement engine
//!
//! Money is exact (`rust_decimal::Decimal`), identifiers are UUIDs, and all
//! timestamps are UTC. Wire-facing structs carry the camelCase field names
//! the central registry and counterparty banks speak.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a transfer
///
/// Only the settlement dispatcher moves a transaction between states:
/// `pending → inProgress → {completed, failed, pending}`. `completed` and
/// `failed` are terminal and never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    /// Waiting to be picked up by a settlement cycle
    Pending,
    /// Claimed by exactly one settlement worker
    InProgress,
    /// Settled with the counterparty and debited locally
    Completed,
    /// Terminally failed; `status_detail` names the cause
    Failed,
}

impl TransactionStatus {
    /// Whether the state accepts no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::InProgress => "inProgress",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A money transfer queued for settlement with a counterparty bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: Uuid,

    /// Source account number (held at this bank)
    pub account_from: String,

    /// Destination account number; its first 3 characters identify the
    /// destination bank
    pub account_to: String,

    /// ISO 4217 currency code
    pub currency: String,

    /// Transfer amount; positive and fixed at creation
    pub amount: Decimal,

    /// Free-text payment explanation
    pub explanation: String,

    /// Sender display name
    pub sender_name: String,

    /// Receiver display name, reported back by the counterparty on
    /// settlement; absent until then
    pub receiver_name: Option<String>,

    /// Lifecycle state
    pub status: TransactionStatus,

    /// Human-readable detail for the last transition; cleared on success
    pub status_detail: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// When the current claim was taken; `None` outside `inProgress`
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new pending transaction
    pub fn new(
        account_from: impl Into<String>,
        account_to: impl Into<String>,
        currency: impl Into<String>,
        amount: Decimal,
        explanation: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_from: account_from.into(),
            account_to: account_to.into(),
            currency: currency.into(),
            amount,
            explanation: explanation.into(),
            sender_name: sender_name.into(),
            receiver_name: None,
            status: TransactionStatus::Pending,
            status_detail: None,
            created_at: Utc::now(),
            claimed_at: None,
        }
    }

    /// Bank prefix of the destination account (first 3 characters)
    pub fn destination_prefix(&self) -> String {
        self.account_to.chars().take(3).collect()
    }

    /// Whether the transfer has outlived its settlement window
    ///
    /// Expiry is calendar-day anchored: the deadline is midnight UTC
    /// `window_days` days after the creation date, not `created_at` plus a
    /// fixed number of hours.
    pub fn is_expired(&self, now: DateTime<Utc>, window_days: i64) -> bool {
        let deadline = (self.created_at.date_naive() + Duration::days(window_days))
            .and_time(NaiveTime::MIN)
            .and_utc();
        now > deadline
    }
}

/// A counterparty bank, as published by the central registry
///
/// Entirely a disposable cache entry: a directory refresh replaces the whole
/// set, never individual rows. Serde names match the registry wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// 3-character bank prefix (unique key)
    #[serde(rename = "bankPrefix")]
    pub prefix: String,

    /// Bank display name
    pub name: String,

    /// Endpoint accepting signed settlement requests
    pub transaction_url: String,

    /// Bank owners, as published by the registry
    pub owners: String,

    /// JWKS endpoint serving the bank's public signing keys
    pub jwks_url: String,
}

/// A local account, debited by the dispatcher on successful settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account number; the first 3 characters are the owning bank's prefix
    pub number: String,

    /// Current balance
    pub balance: Decimal,

    /// ISO 4217 currency code
    pub currency: String,

    /// Owning user
    pub owner: String,
}
