use std::time::Duration;

use credential_store::StorageKeys;

use crate::retry::RetryPolicy;
use crate::url::DEFAULT_BASE_URL;

pub const BASE_URL_ENV_VAR: &str = "RAWBOX_BASE_URL";
pub const TIMEOUT_MS_ENV_VAR: &str = "RAWBOX_TIMEOUT_MS";
pub const MAX_RETRIES_ENV_VAR: &str = "RAWBOX_MAX_RETRIES";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Deployment-facing configuration for the file service client.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the service, without a trailing slash.
    pub base_url: String,
    /// Transport deadline covering connect through body read.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Names under which the two credentials are persisted.
    pub storage_keys: StorageKeys,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            storage_keys: StorageKeys::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from the environment, falling back per field:
    /// unset, blank, or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry = RetryPolicy {
            max_attempts: env_parsed(MAX_RETRIES_ENV_VAR)
                .filter(|attempts| *attempts >= 1)
                .unwrap_or(defaults.retry.max_attempts),
            ..defaults.retry
        };

        Self {
            base_url: env_trimmed(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
            timeout: env_parsed(TIMEOUT_MS_ENV_VAR)
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retry,
            storage_keys: StorageKeys::from_env(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_storage_keys(mut self, storage_keys: StorageKeys) -> Self {
        self.storage_keys = storage_keys;
        self
    }
}

fn env_trimmed(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    env_trimmed(var).and_then(|value| value.parse().ok())
}
