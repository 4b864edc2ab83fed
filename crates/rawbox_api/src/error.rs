use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Closed set of failure categories. Every failure in this crate resolves to
/// exactly one kind; callers branch on the kind, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected before dispatch, or by the server as malformed (400).
    Validation,
    /// Transport reached no conclusion: refused, reset, or unreachable.
    Network,
    /// No response within the configured deadline.
    Timeout,
    /// The server rejected the credential (401).
    Auth,
    /// The server failed (5xx).
    Server,
    /// The named resource does not exist (404, or a derived lookup miss).
    NotFound,
    /// Everything else.
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Server => "server",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw facts about a failed dispatch, before classification.
///
/// `timed_out` marks a client-side deadline expiry; such failures never carry
/// a status because no complete response arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFailure {
    pub status: Option<u16>,
    pub timed_out: bool,
    pub message: String,
}

/// Maps a raw failure to its kind. Total and deterministic; status rules win
/// over everything except the timeout marker, which only applies when no
/// status arrived at all.
#[must_use]
pub fn classify(failure: &RawFailure) -> ErrorKind {
    match failure.status {
        None if failure.timed_out => ErrorKind::Timeout,
        None => ErrorKind::Network,
        Some(401) => ErrorKind::Auth,
        Some(400) => ErrorKind::Validation,
        Some(404) => ErrorKind::NotFound,
        Some(status) if status >= 500 => ErrorKind::Server,
        Some(_) => ErrorKind::Unknown,
    }
}

/// Classified failure surfaced by every fallible operation in this crate.
///
/// The kind is fixed at construction and never rewritten; retryability is
/// derived from it on demand rather than stored.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

impl ServiceError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Auth failures originate from a 401; the status tags along so the iff
    /// relationship between kind and status holds on constructed errors too.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
            status: Some(401),
        }
    }

    /// Classifies `failure` and carries its facts along.
    #[must_use]
    pub fn from_failure(failure: RawFailure) -> Self {
        let kind = classify(&failure);
        let message = if failure.message.trim().is_empty() {
            "request failed".to_string()
        } else {
            failure.message
        };

        Self {
            kind,
            message,
            status: failure.status,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            // A timeout may abort mid-body; the partial status is meaningless.
            return Self::from_failure(RawFailure {
                status: None,
                timed_out: true,
                message: error.to_string(),
            });
        }
        if error.is_decode() {
            return Self::unknown(format!("unexpected response body: {error}"));
        }

        Self::from_failure(RawFailure {
            status: error.status().map(|status| status.as_u16()),
            timed_out: false,
            message: error.to_string(),
        })
    }
}

impl From<credential_store::CredentialStoreError> for ServiceError {
    fn from(error: credential_store::CredentialStoreError) -> Self {
        Self::unknown(format!("credential storage: {error}"))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extracts a human-readable message from an error response body.
///
/// The service wraps failures as `{"code":..,"message":".."}`; some routes
/// use an `error` field instead. Non-JSON bodies are passed through, and an
/// empty body falls back to the status reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let explicit = envelope
            .message
            .as_deref()
            .or(envelope.error.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty());
        if let Some(message) = explicit {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
