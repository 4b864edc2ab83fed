use std::sync::Arc;

use credential_store::{CredentialKind, CredentialStore};

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::events::AuthEvents;
use crate::payload::{
    DirectoryListing, FileEntry, FilesResponse, LoginRequest, LoginResponse, LogsResponse,
};
use crate::pipeline::{RequestPipeline, RequestSpec};
use crate::stats::{LogSummarizer, StatsSummary};
use crate::url::{self, FILES_ENDPOINT, LOGIN_ENDPOINT, LOGS_ENDPOINT};

/// An issued token together with the slot it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub kind: CredentialKind,
}

impl Credential {
    #[must_use]
    pub fn session(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: CredentialKind::Session,
        }
    }

    #[must_use]
    pub fn api(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: CredentialKind::Api,
        }
    }
}

/// Typed operations against the file service, built on [`RequestPipeline`].
///
/// Every operation validates its inputs before dispatch; a call that fails
/// validation never reaches the network.
pub struct FileServiceClient {
    pipeline: RequestPipeline,
    summarizer: Option<Box<dyn LogSummarizer>>,
}

impl FileServiceClient {
    pub fn new(
        config: ServiceConfig,
        store: Arc<CredentialStore>,
        events: AuthEvents,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            pipeline: RequestPipeline::new(config, store, events)?,
            summarizer: None,
        })
    }

    /// Enables statistics derivation from raw access logs. Without a
    /// summarizer, [`fetch_stats`](Self::fetch_stats) refuses.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: impl LogSummarizer + 'static) -> Self {
        self.summarizer = Some(Box::new(summarizer));
        self
    }

    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn pipeline_mut(&mut self) -> &mut RequestPipeline {
        &mut self.pipeline
    }

    /// Exchanges operator credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ServiceError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::validation(
                "username and password must not be empty",
            ));
        }

        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .map_err(|error| ServiceError::unknown(format!("encoding login payload: {error}")))?;
        let spec = RequestSpec::post(LOGIN_ENDPOINT).with_body(body);
        let response = self.pipeline.execute(&spec).await?;
        let envelope: LoginResponse = response.json().await.map_err(ServiceError::from)?;

        // The HTTP status already said 2xx; a body without a token is the
        // server's way of failing anyway.
        let token = envelope.token.trim();
        if token.is_empty() {
            let message = envelope
                .message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .unwrap_or("login response carried no token");
            return Err(ServiceError::unknown(message));
        }

        Ok(Credential::session(token))
    }

    /// Lists the directory at `path`. Directory paths are absolute; `.` and
    /// other relative forms are rejected before dispatch.
    pub async fn list_directory(
        &self,
        path: &str,
        credential_override: Option<&str>,
    ) -> Result<DirectoryListing, ServiceError> {
        let trimmed = path.trim();
        if !trimmed.starts_with('/') {
            return Err(ServiceError::validation(format!(
                "directory path must be absolute, got '{path}'"
            )));
        }

        let spec = RequestSpec::get(FILES_ENDPOINT)
            .with_query("dir", trimmed)
            .with_credential_override(credential_override);
        let response = self.pipeline.execute(&spec).await?;
        let files: FilesResponse = response.json().await.map_err(ServiceError::from)?;

        Ok(DirectoryListing::from(files))
    }

    /// Metadata for a single file, derived by listing its parent directory
    /// and matching on the name. Bare names resolve against the root. Costs
    /// one listing round-trip; there is no dedicated endpoint for this.
    pub async fn file_info(
        &self,
        path: &str,
        credential_override: Option<&str>,
    ) -> Result<FileEntry, ServiceError> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return Err(ServiceError::validation(format!(
                "file path must name a file, got '{path}'"
            )));
        }

        let rooted = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        let (parent, name) = match rooted.rsplit_once('/') {
            Some(("", name)) => ("/", name),
            Some((parent, name)) => (parent, name),
            None => ("/", rooted.as_str()),
        };

        let listing = self.list_directory(parent, credential_override).await?;
        listing.find(name).cloned().ok_or_else(|| {
            ServiceError::not_found(format!("no entry named '{name}' in '{parent}'"))
        })
    }

    /// Builds the direct retrieval URL for `path`. Pure construction: no
    /// I/O, no store access, no credential attachment beyond the optional
    /// `api` query token.
    pub fn download_url(&self, path: &str, api_token: Option<&str>) -> Result<String, ServiceError> {
        url::download_url(&self.pipeline.config().base_url, path, api_token)
    }

    /// Fetches raw access logs, optionally filtered to one day
    /// (`YYYY-MM-DD`).
    pub async fn fetch_logs(
        &self,
        credential_override: Option<&str>,
        date: Option<&str>,
    ) -> Result<LogsResponse, ServiceError> {
        self.require_credential(credential_override)?;

        let mut spec =
            RequestSpec::get(LOGS_ENDPOINT).with_credential_override(credential_override);
        if let Some(date) = date.map(str::trim).filter(|date| !date.is_empty()) {
            spec = spec.with_query("date", date);
        }

        let response = self.pipeline.execute(&spec).await?;
        response.json().await.map_err(ServiceError::from)
    }

    /// Usage statistics, derived from the access logs by the configured
    /// summarizer. Numbers are computed, never invented: without a
    /// summarizer, or when the server returns no records, the call fails.
    pub async fn fetch_stats(
        &self,
        credential_override: Option<&str>,
    ) -> Result<StatsSummary, ServiceError> {
        let Some(summarizer) = self.summarizer.as_deref() else {
            return Err(ServiceError::unknown(
                "statistics are unavailable: no log summarizer is configured",
            ));
        };

        let logs = self.fetch_logs(credential_override, None).await?;
        let records = logs.into_records();
        if records.is_empty() {
            return Err(ServiceError::unknown(
                "statistics are unavailable: the log response carried no records",
            ));
        }

        Ok(summarizer.summarize(&records))
    }

    /// Authenticated reads need some token up front so the failure is a
    /// local validation error instead of a pointless round-trip to a 401.
    fn require_credential(&self, credential_override: Option<&str>) -> Result<(), ServiceError> {
        if credential_override
            .map(str::trim)
            .is_some_and(|token| !token.is_empty())
        {
            return Ok(());
        }

        let stored = self.pipeline.store().get(CredentialKind::Session)?;
        if stored.map(|token| token.trim().is_empty()).unwrap_or(true) {
            return Err(ServiceError::validation(
                "no session credential available; log in first",
            ));
        }

        Ok(())
    }
}
