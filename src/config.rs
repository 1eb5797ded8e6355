//! Configuration for the ACP bridge.
//!
//! All settings come from environment variables (a `.env` file is honored
//! when present). The three wallet settings are required; absence of any
//! one is fatal at startup. The private key never appears in logs or
//! `Debug` output.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bootstrap connection attempts when `ACP_CONNECT_ATTEMPTS` is unset.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Delegation reply timeout when `ACP_REPLY_TIMEOUT_SECS` is unset.
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 120;

/// Service label when `ACP_SERVICE_NAME` is unset.
pub const DEFAULT_SERVICE_NAME: &str = "acp";

/// Main configuration for the bridge.
#[derive(Debug, Clone)]
pub struct AcpConfig {
    /// Whitelisted wallet private key the client signs with.
    pub wallet_private_key: SecretString,
    /// Numeric entity identifier registered with the exchange.
    pub entity_id: u64,
    /// Wallet address this agent trades under.
    pub agent_wallet_address: String,
    /// Connection attempts the bootstrapper makes before giving up.
    pub connect_attempts: u32,
    /// How long delegation waits for the single inference reply.
    pub reply_timeout: Duration,
    /// Label used in bootstrap errors and log lines.
    pub service_name: String,
}

impl AcpConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let wallet_private_key = require_env("ACP_WALLET_PRIVATE_KEY")?;
        validate_hex_field("ACP_WALLET_PRIVATE_KEY", &wallet_private_key, 64)?;

        let entity_id = require_env("ACP_ENTITY_ID")?
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "ACP_ENTITY_ID".to_string(),
                message: format!("{e}"),
            })?;

        let agent_wallet_address = require_env("ACP_AGENT_WALLET_ADDRESS")?;
        validate_hex_field("ACP_AGENT_WALLET_ADDRESS", &agent_wallet_address, 40)?;

        let connect_attempts: u32 =
            parse_optional_env("ACP_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS)?;
        if connect_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACP_CONNECT_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let reply_timeout_secs: u64 =
            parse_optional_env("ACP_REPLY_TIMEOUT_SECS", DEFAULT_REPLY_TIMEOUT_SECS)?;
        if reply_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACP_REPLY_TIMEOUT_SECS".to_string(),
                message: "the reply timeout is mandatory; must be at least 1".to_string(),
            });
        }

        let service_name = optional_env("ACP_SERVICE_NAME")?
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        Ok(Self {
            wallet_private_key: SecretString::from(wallet_private_key),
            entity_id,
            agent_wallet_address,
            connect_attempts,
            reply_timeout: Duration::from_secs(reply_timeout_secs),
            service_name,
        })
    }
}

/// Validate a `0x`-prefixed hex field of an exact width.
fn validate_hex_field(key: &str, value: &str, hex_len: usize) -> Result<(), ConfigError> {
    let body = value
        .strip_prefix("0x")
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must start with 0x".to_string(),
        })?;
    if body.len() != hex_len {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected {hex_len} hex characters after 0x, got {}", body.len()),
        });
    }
    hex::decode(body).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e}"),
    })?;
    Ok(())
}

// Helper functions

fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}
