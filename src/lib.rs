//! Client core for the RawBox file-sharing service.
//!
//! Invariant: single network gate — every call reaches the service through
//! `rawbox_api::RequestPipeline::execute(..)`, which attaches the session
//! credential, classifies failures, retries within the configured bound, and
//! broadcasts auth invalidation.
//!
//! # Public API Overview
//! - Drive the session through [`SessionModel`] actions (`login`,
//!   `load_directory`, `load_stats`, `logout`) and read [`SessionState`]
//!   snapshots.
//! - Reach the typed operations directly via [`FileServiceClient`] when no
//!   observable state is wanted.
//! - Persist tokens with [`CredentialStore`] under configuration-named keys.
//! - Subscribe to [`AuthEvents`] for decoupled logout-style cleanup.

pub mod model;
pub mod state;

pub use crate::model::SessionModel;
pub use crate::state::{SessionState, INITIAL_PATH};

pub use credential_store::{CredentialKind, CredentialStore, StorageKeys};
pub use rawbox_api::{
    AccessLogSummarizer, AuthEvent, AuthEvents, Credential, DirectoryListing, ErrorKind,
    FileEntry, FileServiceClient, LogSummarizer, RetryPolicy, ServiceConfig, ServiceError,
    StatsSummary,
};
