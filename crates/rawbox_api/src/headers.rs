use std::collections::BTreeMap;

/// Header carrying the session credential on authenticated calls.
pub const HEADER_API_TOKEN: &str = "x-api-token";
pub const HEADER_ACCEPT: &str = "accept";

/// Build a deterministic header map for file service requests.
///
/// The credential header is present exactly when a non-blank token is given;
/// protected endpoints answer its absence with a 401.
#[must_use]
pub fn build_headers(session_token: Option<&str>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());

    if let Some(token) = session_token.map(str::trim).filter(|token| !token.is_empty()) {
        headers.insert(HEADER_API_TOKEN.to_owned(), token.to_owned());
    }

    headers
}
