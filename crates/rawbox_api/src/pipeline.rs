use std::sync::Arc;

use credential_store::{CredentialKind, CredentialStore};
use reqwest::{Client, Method, Response};
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{parse_error_message, ErrorKind, RawFailure, ServiceError};
use crate::events::{AuthEvent, AuthEvents};
use crate::headers::{build_headers, HEADER_API_TOKEN};
use crate::url::service_url;

/// One outbound call, described independently of the transport.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Endpoint path, joined onto the configured base URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Token to attach instead of the stored session credential.
    pub credential_override: Option<String>,
}

impl RequestSpec {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            credential_override: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_credential_override(mut self, token: Option<&str>) -> Self {
        self.credential_override = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        self
    }
}

/// The request as stages see it, after URL resolution and before dispatch.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: std::collections::BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
}

/// One stage of the outbound pipeline, applied in order on every attempt.
///
/// A stage may rewrite the request, short-circuit the call by returning an
/// error, or perform a side effect such as reading the credential store.
pub trait RequestStage: Send + Sync {
    fn apply(&self, spec: &RequestSpec, request: &mut OutboundRequest)
        -> Result<(), ServiceError>;
}

/// Built-in first stage: attaches the session credential header.
///
/// The store is consulted on every attempt rather than once per call, so a
/// credential written mid-retry is picked up and a cleared one is not resent.
struct CredentialStage {
    store: Arc<CredentialStore>,
}

impl RequestStage for CredentialStage {
    fn apply(
        &self,
        spec: &RequestSpec,
        request: &mut OutboundRequest,
    ) -> Result<(), ServiceError> {
        let token = match &spec.credential_override {
            Some(token) => Some(token.clone()),
            None => self.store.get(CredentialKind::Session)?,
        };

        if let Some(token) = token.as_deref().map(str::trim).filter(|token| !token.is_empty()) {
            request
                .headers
                .insert(HEADER_API_TOKEN.to_owned(), token.to_owned());
        }

        Ok(())
    }
}

/// The single chokepoint every network call passes through.
///
/// Per call: run the stage list over the outbound request, dispatch, classify
/// any failure, tear down credentials on `Auth`, and retry per the configured
/// policy with backoff applied before every attempt after the first.
pub struct RequestPipeline {
    http: Client,
    config: ServiceConfig,
    store: Arc<CredentialStore>,
    events: AuthEvents,
    stages: Vec<Box<dyn RequestStage>>,
}

impl RequestPipeline {
    pub fn new(
        config: ServiceConfig,
        store: Arc<CredentialStore>,
        events: AuthEvents,
    ) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ServiceError::from)?;

        let stages: Vec<Box<dyn RequestStage>> = vec![Box::new(CredentialStage {
            store: Arc::clone(&store),
        })];

        Ok(Self {
            http,
            config,
            store,
            events,
            stages,
        })
    }

    /// Appends a stage after the built-in credential stage.
    pub fn push_stage(&mut self, stage: Box<dyn RequestStage>) {
        self.stages.push(stage);
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    #[must_use]
    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Executes `spec` to completion: a successful response, or the
    /// classified error of the last attempt.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Response, ServiceError> {
        let retry = self.config.retry;
        let mut attempt = 1;

        loop {
            let delay = retry.delay_before(attempt);
            if !delay.is_zero() {
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    path = %spec.path,
                    "waiting before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match self.dispatch(spec).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if error.kind() == ErrorKind::Auth {
                        // Auth exits the loop, so the teardown and the
                        // broadcast happen once per failed call, not per
                        // attempt.
                        self.invalidate_credentials(error.message());
                        return Err(error);
                    }

                    if retry.should_retry(error.kind(), attempt) {
                        attempt += 1;
                        continue;
                    }

                    return Err(error);
                }
            }
        }
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<Response, ServiceError> {
        let mut outbound = OutboundRequest {
            method: spec.method.clone(),
            url: service_url(&self.config.base_url, &spec.path),
            query: spec.query.clone(),
            headers: build_headers(None),
            body: spec.body.clone(),
        };

        for stage in &self.stages {
            stage.apply(spec, &mut outbound)?;
        }

        debug!(method = %outbound.method, url = %outbound.url, "dispatching request");

        let mut builder = self.http.request(outbound.method.clone(), &outbound.url);
        if !outbound.query.is_empty() {
            builder = builder.query(&outbound.query);
        }
        for (name, value) in &outbound.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &outbound.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ServiceError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(status, &body);

        Err(ServiceError::from_failure(RawFailure {
            status: Some(status.as_u16()),
            timed_out: false,
            message,
        }))
    }

    /// A rejected credential is useless everywhere: drop both stored slots
    /// and tell whoever listens.
    fn invalidate_credentials(&self, message: &str) {
        if let Err(error) = self.store.clear_all() {
            warn!(%error, "failed to clear stored credentials after auth rejection");
        }

        let delivered = self.events.publish(AuthEvent::Invalidated {
            message: message.to_string(),
        });
        warn!(subscribers = delivered, %message, "session credential invalidated");
    }
}
