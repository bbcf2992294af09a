use cosmtx_core::types::{
    transaction::{DraftBuilder, TransactionError},
    Address, Coin, DEFAULT_ADDRESS_PREFIX,
};
use cosmtx_providers::{Http, Provider};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error;
use url::Url;

const DEFAULT_ENDPOINT: &str = "http://localhost:26657";
const DEFAULT_CHAIN_ID: &str = "local-1";
const DEFAULT_KEY_NAME: &str = "default";
const DEFAULT_GAS_LIMIT: u64 = 100_000;
const DEFAULT_FEE_AMOUNT: u128 = 750;
const DEFAULT_FEE_DENOM: &str = "utest";
const DEFAULT_POLL_ATTEMPTS: usize = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Error)]
/// Error thrown while loading a [`SignerConfig`]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds a value no client could work with
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

/// Everything a signing client needs to know about the chain and its key.
///
/// Missing fields take their default value, which targets a local single node test chain:
///
/// ```
/// use cosmtx_middleware::SignerConfig;
///
/// let config: SignerConfig = serde_json::from_str(r#"{ "chain_id": "testnet-3" }"#).unwrap();
/// assert_eq!(config.chain_id, "testnet-3");
/// assert_eq!(config.fee.to_string(), "750utest");
/// assert_eq!(config.endpoint.as_str(), "http://localhost:26657/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    /// CometBFT RPC endpoint
    pub endpoint: Url,
    pub chain_id: String,
    /// Name of the signing key in the key store
    pub key_name: String,
    /// Bech32 prefix of account addresses
    pub address_prefix: String,
    pub gas_limit: u64,
    /// Fee paid by every transaction, e.g. `"750utest"`
    pub fee: Coin,
    /// How many times to query for a broadcast transaction
    pub poll_attempts: usize,
    /// Pause between two queries, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("should parse the default endpoint"),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            key_name: DEFAULT_KEY_NAME.to_string(),
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT,
            fee: Coin { amount: DEFAULT_FEE_AMOUNT, denom: DEFAULT_FEE_DENOM.to_string() },
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SignerConfig {
    /// Reads and validates a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Checks the fields serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = self.endpoint.scheme();
        if !matches!(scheme, "http" | "https") {
            return Err(invalid("endpoint", format!("unsupported scheme {scheme}")))
        }
        if self.chain_id.trim().is_empty() {
            return Err(invalid("chain_id", "must not be empty"))
        }
        if self.key_name.is_empty() {
            return Err(invalid("key_name", "must not be empty"))
        }
        Address::new(self.address_prefix.as_str(), [0u8; 20])
            .map_err(|err| invalid("address_prefix", err.to_string()))?;
        if self.gas_limit == 0 {
            return Err(invalid("gas_limit", "must be positive"))
        }
        if self.poll_attempts == 0 {
            return Err(invalid("poll_attempts", "must be positive"))
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// An HTTP provider for the endpoint, polling at the configured interval
    pub fn provider(&self) -> Provider<Http> {
        Provider::new(Http::new(self.endpoint.clone())).interval(self.poll_interval())
    }

    /// A draft builder preset with the configured gas limit, fee and the given signer
    pub fn draft_builder(&self, signer: Address) -> Result<DraftBuilder, TransactionError> {
        let mut builder = DraftBuilder::new();
        builder.set_gas_limit(self.gas_limit)?.set_fee(vec![self.fee.clone()])?;
        builder.set_signer_address(signer);
        Ok(builder)
    }
}

impl std::str::FromStr for SignerConfig {
    type Err = ConfigError;

    /// Parses and validates a JSON config
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: SignerConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
