mod error;
mod keys;
mod store;

pub use error::CredentialStoreError;
pub use keys::{
    StorageKeys, API_TOKEN_KEY_ENV_VAR, DEFAULT_API_TOKEN_KEY, DEFAULT_SESSION_TOKEN_KEY,
    SESSION_TOKEN_KEY_ENV_VAR,
};
pub use store::{CredentialKind, CredentialStore};
