/// The environment variable that points at the SEENTIA backend.
pub const API_URL_VAR: &str = "SEENTIA_API_URL";

/// Where requests go when [`API_URL_VAR`] isn't set - the backend's
/// local-development address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Resolve the backend base URL from the environment, falling back to
/// [`DEFAULT_API_URL`]. A trailing slash is stripped so endpoint paths can
/// always be appended with a single `/`.
pub fn api_url() -> String {
    let url = std::env::var(API_URL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    url.trim_end_matches('/').to_string()
}
