//! Transfer signing service
//!
//! Holds the process-lifetime RSA private key and produces the compact
//! RS256 token counterparty banks verify against our published JWKS. The
//! signer is pure given the key: same transaction in, same payload out, no
//! side effects and no retries. A key that cannot be read or used is a
//! startup failure, never a per-transaction one.

use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ledger_store::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Claims carried by a signed settlement token
///
/// Field names match the interbank wire contract (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferClaims {
    /// Source account number
    pub account_from: String,
    /// Destination account number
    pub account_to: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Transfer amount
    pub amount: Decimal,
    /// Free-text payment explanation
    pub explanation: String,
    /// Sender display name
    pub sender_name: String,
}

impl TransferClaims {
    /// Build the signing payload for a transaction
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            account_from: transaction.account_from.clone(),
            account_to: transaction.account_to.clone(),
            currency: transaction.currency.clone(),
            amount: transaction.amount,
            explanation: transaction.explanation.clone(),
            sender_name: transaction.sender_name.clone(),
        }
    }

    /// Throwaway payload used to prove a freshly loaded key is usable
    fn probe() -> Self {
        Self {
            account_from: String::new(),
            account_to: String::new(),
            currency: String::new(),
            amount: Decimal::ZERO,
            explanation: String::new(),
            sender_name: String::new(),
        }
    }
}

/// RS256 signer over the process-lifetime private key
pub struct TransferSigner {
    key: EncodingKey,
    header: Header,
}

impl TransferSigner {
    /// Load the signing key from PEM bytes
    ///
    /// The constructor signs a probe payload so that a malformed or
    /// non-RSA key fails here, at startup, instead of inside a settlement
    /// pipeline.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| Error::Signing(format!("Unusable RSA private key: {}", e)))?;

        let signer = Self {
            key,
            header: Header::new(Algorithm::RS256),
        };
        signer.sign_claims(&TransferClaims::probe())?;

        Ok(signer)
    }

    /// Load the signing key from a PEM file
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        let pem = std::fs::read(path.as_ref()).map_err(|e| {
            Error::Signing(format!(
                "Cannot read signing key {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_pem(&pem)
    }

    /// Produce the compact signed token for a transaction
    pub fn sign(&self, transaction: &Transaction) -> Result<String> {
        self.sign_claims(&TransferClaims::from_transaction(transaction))
    }

    fn sign_claims(&self, claims: &TransferClaims) -> Result<String> {
        encode(&self.header, claims, &self.key)
            .map_err(|e| Error::Signing(format!("Token construction failed: {}", e)))
    }
}

impl std::fmt::Debug for TransferSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key material stays out of logs
        f.debug_struct("TransferSigner")
            .field("algorithm", &self.header.alg)
            .finish()
    }
}

/// Verify a compact settlement token against an RSA public key (PEM)
///
/// Validates the signature only; settlement tokens carry no `exp` claim.
pub fn verify_token(token: &str, public_pem: &[u8]) -> Result<TransferClaims> {
    let key = DecodingKey::from_rsa_pem(public_pem)
        .map_err(|e| Error::Signing(format!("Unusable RSA public key: {}", e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TransferClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| Error::Signing(format!("Token verification failed: {}", e)))
}
