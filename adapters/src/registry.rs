//! Central registry client
//!
//! Fetches the authoritative bank list. The registry is the single source of
//! truth for counterparty banks; the directory cache mirrors it wholesale.

use crate::error::{Error, Result};
use ledger_store::Bank;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Client for the central registry's bank listing
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RegistryClient {
    /// Create a new registry client with the given request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch the full bank list from `GET {base_url}/banks`
    ///
    /// The call is authenticated with the `Api-Key` header. Any transport
    /// failure, non-success status, or undecodable body is a registry error;
    /// the caller decides whether to retry on a later cycle.
    pub async fn fetch_banks(&self) -> Result<Vec<Bank>> {
        let url = format!("{}/banks", self.base_url.trim_end_matches('/'));
        debug!("Fetching bank list from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::RegistryUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::RegistryStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<Bank>>()
            .await
            .map_err(|e| Error::RegistryMalformed(e.to_string()))
    }
}
