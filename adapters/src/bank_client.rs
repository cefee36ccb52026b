//! Counterparty bank client
//!
//! Posts a signed settlement token to the destination bank's transaction
//! endpoint and classifies the outcome. The deadline is enforced with
//! `tokio::time::timeout` wrapping both the request and the body read:
//! when it expires the in-flight future is dropped, which aborts the
//! underlying connection, so a late response can never be observed as
//! success. Retry policy belongs to the dispatcher, not this client.

use crate::error::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Successful settlement response from the counterparty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    /// Receiver display name reported by the destination bank
    pub receiver_name: String,
}

/// Classified outcome of one settlement dispatch
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// 2xx response carrying a `receiverName`
    Success(SettlementResponse),
    /// The counterparty answered but rejected the transfer; carries the
    /// body's `error` field if present, else the serialized response
    ApplicationError(String),
    /// The hard deadline elapsed; the in-flight call was abandoned
    Timeout,
    /// Connection-level failure within the deadline (refused, DNS, TLS)
    NetworkError(String),
}

/// HTTP client for counterparty settlement endpoints
#[derive(Debug, Clone)]
pub struct RemoteBankClient {
    client: Client,
    deadline: Duration,
}

impl RemoteBankClient {
    /// Create a client with the given hard dispatch deadline
    pub fn new(deadline: Duration) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, deadline })
    }

    /// POST `{"jwt": token}` to the endpoint and classify the outcome
    pub async fn send(&self, endpoint_url: &str, token: &str) -> DispatchOutcome {
        debug!("Dispatching settlement to {}", endpoint_url);

        let call = async {
            let response = self
                .client
                .post(endpoint_url)
                .json(&serde_json::json!({ "jwt": token }))
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<(StatusCode, String), reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.deadline, call).await {
            Err(_) => {
                warn!(
                    "Dispatch to {} exceeded the {} ms deadline, abandoning call",
                    endpoint_url,
                    self.deadline.as_millis()
                );
                return DispatchOutcome::Timeout;
            }
            Ok(Err(e)) if e.is_timeout() => return DispatchOutcome::Timeout,
            Ok(Err(e)) => return DispatchOutcome::NetworkError(e.to_string()),
            Ok(Ok(pair)) => pair,
        };

        Self::classify(status, &body)
    }

    /// Map a received response to success or application error
    fn classify(status: StatusCode, body: &str) -> DispatchOutcome {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);

        if status.is_success() {
            if let Some(name) = value.get("receiverName").and_then(Value::as_str) {
                return DispatchOutcome::Success(SettlementResponse {
                    receiver_name: name.to_string(),
                });
            }
        }

        let detail = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", status.as_u16(), body));

        DispatchOutcome::ApplicationError(detail)
    }
}
