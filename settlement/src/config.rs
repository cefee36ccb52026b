//! Configuration for the settlement engine
//!
//! Values load from a TOML file or from the environment (with `.env`
//! support); the hard numbers below are the production defaults and the
//! tests override them per case.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Own bank's 3-character prefix
    pub bank_prefix: String,

    /// Central registry access
    pub registry: RegistryConfig,

    /// Transfer signing
    pub signing: SigningConfig,

    /// Store connection
    pub store: StoreConfig,

    /// Dispatcher timing
    pub dispatcher: DispatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_prefix: "clr".to_string(),
            registry: RegistryConfig::default(),
            signing: SigningConfig::default(),
            store: StoreConfig::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

/// Central registry access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry base URL; the bank list lives at `{base_url}/banks`
    pub base_url: String,

    /// API key sent in the `Api-Key` header
    pub api_key: String,

    /// Registry request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://registry.example.com".to_string(),
            api_key: String::new(),
            timeout_seconds: adapters::DEFAULT_REGISTRY_TIMEOUT_SECONDS,
        }
    }
}

/// Transfer signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Path to the RSA private key (PEM)
    pub private_key_path: PathBuf,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("./keys/private.pem"),
        }
    }
}

/// Store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection target for the persistence backend
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
        }
    }
}

/// Dispatcher timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Delay between settlement cycles in milliseconds
    pub cycle_interval_ms: u64,

    /// Hard deadline for one outbound settlement call in milliseconds
    pub dispatch_timeout_ms: u64,

    /// Calendar days before an unsettled transfer expires
    pub expiry_days: i64,

    /// Seconds before an abandoned claim is returned to the pending queue
    pub claim_lease_seconds: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: 1000,
            dispatch_timeout_ms: adapters::DEFAULT_DISPATCH_TIMEOUT_MS,
            expiry_days: 3,
            claim_lease_seconds: 300,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults with environment overrides (reads `.env` first)
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("BANK_PREFIX") {
            config.bank_prefix = prefix;
        }
        if let Ok(url) = std::env::var("CENTRAL_REGISTRY_URL") {
            config.registry.base_url = url;
        }
        if let Ok(key) = std::env::var("CENTRAL_REGISTRY_API_KEY") {
            config.registry.api_key = key;
        }
        if let Ok(path) = std::env::var("SIGNING_KEY_PATH") {
            config.signing.private_key_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("STORE_URL") {
            config.store.url = url;
        }
        if let Ok(interval) = std::env::var("CYCLE_INTERVAL_MS") {
            config.dispatcher.cycle_interval_ms = interval
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid CYCLE_INTERVAL_MS: {}", e)))?;
        }

        Ok(config)
    }
}
