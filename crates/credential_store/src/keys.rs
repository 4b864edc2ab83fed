use crate::error::CredentialStoreError;

pub const SESSION_TOKEN_KEY_ENV_VAR: &str = "RAWBOX_SESSION_TOKEN_KEY";
pub const API_TOKEN_KEY_ENV_VAR: &str = "RAWBOX_API_TOKEN_KEY";

pub const DEFAULT_SESSION_TOKEN_KEY: &str = "rawbox_session_token";
pub const DEFAULT_API_TOKEN_KEY: &str = "rawbox_api_token";

/// Names of the two credential slots as they appear on disk.
///
/// Key names are configuration, not code: deployments that already persist
/// tokens under different names point the store at them instead of migrating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub session: String,
    pub api: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: DEFAULT_SESSION_TOKEN_KEY.to_string(),
            api: DEFAULT_API_TOKEN_KEY.to_string(),
        }
    }
}

impl StorageKeys {
    #[must_use]
    pub fn new(session: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            api: api.into(),
        }
    }

    /// Reads key names from the environment, falling back to the defaults
    /// when a variable is unset or blank.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            session: key_name_from_env(SESSION_TOKEN_KEY_ENV_VAR, DEFAULT_SESSION_TOKEN_KEY),
            api: key_name_from_env(API_TOKEN_KEY_ENV_VAR, DEFAULT_API_TOKEN_KEY),
        }
    }
}

fn key_name_from_env(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Key names become file names under the store root, so they must not
/// escape it or collide with the store's staging files.
pub(crate) fn validate_key_name(key: &str) -> Result<(), CredentialStoreError> {
    let invalid = key.trim().is_empty()
        || key.starts_with('.')
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..");

    if invalid {
        return Err(CredentialStoreError::InvalidKeyName {
            key: key.to_string(),
        });
    }

    Ok(())
}
