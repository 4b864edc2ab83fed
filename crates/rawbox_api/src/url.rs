use reqwest::Url;

use crate::error::ServiceError;

/// Default base URL for a locally hosted service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:18080";

pub const LOGIN_ENDPOINT: &str = "/admin/login";
pub const FILES_ENDPOINT: &str = "/admin/files";
pub const LOGS_ENDPOINT: &str = "/admin/logs";

/// Normalize a configured base URL: trim whitespace and trailing slashes,
/// fall back to the default when blank.
#[must_use]
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Join a service endpoint path onto the normalized base URL.
#[must_use]
pub fn service_url(base_url: &str, endpoint: &str) -> String {
    format!("{}{endpoint}", normalize_base_url(base_url))
}

/// Build a direct retrieval URL for `path`, percent-encoding the path and
/// appending `api=<token>` when a token is present.
///
/// Pure string construction; nothing is fetched here.
pub fn download_url(
    base_url: &str,
    path: &str,
    api_token: Option<&str>,
) -> Result<String, ServiceError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("download path must not be empty"));
    }

    let base = normalize_base_url(base_url);
    let parsed = Url::parse(&base)
        .map_err(|error| ServiceError::validation(format!("invalid base URL '{base}': {error}")))?;

    let rooted = format!("/{}", trimmed.trim_start_matches('/'));
    let mut url = parsed.join(&rooted).map_err(|error| {
        ServiceError::validation(format!("cannot resolve '{trimmed}' against '{base}': {error}"))
    })?;

    if let Some(token) = api_token.map(str::trim).filter(|token| !token.is_empty()) {
        url.query_pairs_mut().append_pair("api", token);
    }

    Ok(url.to_string())
}
