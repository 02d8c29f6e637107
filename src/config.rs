//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{AppError, Result};

/// Keychain service name under which the API key is stored.
pub const KEYRING_SERVICE: &str = "lumos-cli";

/// Keychain entry holding the API key.
pub const KEYRING_API_KEY: &str = "api_key";

/// Environment variable consulted when the keychain has no API key.
pub const API_KEY_ENV: &str = "LUMOS_API_KEY";

/// Polling cadence and wait-budget bounds for request status loops.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PollingConfig {
    /// Seconds between two status fetches.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Budget used when the caller's budget is out of range.
    #[serde(default = "default_wait_seconds")]
    pub default_wait_seconds: u64,
    /// Smallest accepted wait budget.
    #[serde(default = "default_min_wait_seconds")]
    pub min_wait_seconds: u64,
    /// Largest accepted wait budget.
    #[serde(default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            default_wait_seconds: default_wait_seconds(),
            min_wait_seconds: default_min_wait_seconds(),
            max_wait_seconds: default_max_wait_seconds(),
        }
    }
}

fn default_interval_seconds() -> u64 {
    6
}

fn default_wait_seconds() -> u64 {
    120
}

fn default_min_wait_seconds() -> u64 {
    10
}

fn default_max_wait_seconds() -> u64 {
    300
}

fn default_api_url() -> String {
    "https://api.lumos.com".into()
}

fn default_page_size() -> usize {
    25
}

/// Global configuration parsed from an optional `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Base URL of the backend API, without trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Page size used by interactive searches.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Request polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
    /// API bearer token (populated at runtime, never from TOML).
    #[serde(skip)]
    pub api_key: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            polling: PollingConfig::default(),
            api_key: String::new(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the API key from the OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither the keychain nor
    /// `LUMOS_API_KEY` provides a key.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.api_key = load_credential(KEYRING_API_KEY, API_KEY_ENV).await?;
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.api_url = self.api_url.trim_end_matches('/').to_owned();
        if self.api_url.is_empty() {
            return Err(AppError::Config("api_url must not be empty".into()));
        }

        if self.page_size == 0 {
            return Err(AppError::Config(
                "page_size must be greater than zero".into(),
            ));
        }

        let polling = &self.polling;
        if polling.interval_seconds == 0 {
            return Err(AppError::Config(
                "polling.interval_seconds must be greater than zero".into(),
            ));
        }
        if polling.min_wait_seconds > polling.max_wait_seconds {
            return Err(AppError::Config(
                "polling.min_wait_seconds must not exceed polling.max_wait_seconds".into(),
            ));
        }
        if !(polling.min_wait_seconds..=polling.max_wait_seconds)
            .contains(&polling.default_wait_seconds)
        {
            return Err(AppError::Config(
                "polling.default_wait_seconds must lie within the min/max wait bounds".into(),
            ));
        }

        Ok(())
    }
}

/// Store the API key in the OS keychain.
///
/// # Errors
///
/// Returns `AppError::Config` if the keychain rejects the write.
pub async fn store_api_key(api_key: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_API_KEY)
            .and_then(|entry| entry.set_password(&api_key))
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?
    .map_err(|err| AppError::Config(format!("failed to store api key: {err}")))
}

/// Remove the API key from the OS keychain.
///
/// A missing entry is not an error.
///
/// # Errors
///
/// Returns `AppError::Config` if the keychain rejects the delete.
pub async fn delete_api_key() -> Result<()> {
    let result = tokio::task::spawn_blocking(|| {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_API_KEY)
            .and_then(|entry| entry.delete_credential())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(AppError::Config(format!("failed to delete api key: {err}"))),
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.trim().is_empty() => return Ok(value.trim().to_owned()),
        Ok(_) => {
            debug!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            debug!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var; run `lumos login`"
        ))),
    }
}
