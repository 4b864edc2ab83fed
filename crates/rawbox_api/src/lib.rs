//! Transport-only RawBox file service client primitives.
//!
//! This crate owns the request/response pipeline for the RawBox admin
//! endpoints: credential attachment, failure classification into a closed
//! taxonomy, bounded retry with exponential backoff, and auth-invalidation
//! broadcasting. It intentionally contains no state model and no UI
//! coupling; `rawbox_client` layers the observable session state on top.
//!
//! Every network call goes through [`RequestPipeline::execute`]. Typed
//! operations live on [`FileServiceClient`]; statistics derivation from raw
//! access logs is opt-in via [`LogSummarizer`].

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod pipeline;
pub mod retry;
pub mod stats;
pub mod url;

pub use client::{Credential, FileServiceClient};
pub use config::ServiceConfig;
pub use error::{classify, parse_error_message, ErrorKind, RawFailure, ServiceError};
pub use events::{AuthEvent, AuthEvents};
pub use payload::{AccessRecord, DirectoryListing, FileEntry, LogsResponse};
pub use pipeline::{OutboundRequest, RequestPipeline, RequestSpec, RequestStage};
pub use retry::{is_retryable, RetryPolicy};
pub use stats::{AccessLogSummarizer, HotFile, HotIp, LogSummarizer, StatsSummary};
pub use url::normalize_base_url;
