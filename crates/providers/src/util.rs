//! Shared utility functions for the HTTP clients.

use sd_domain::error::{Error, Result};
use std::time::Duration;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Build an HTTP client. Without `timeout_ms` no request timeout is set.
pub(crate) fn http_client(timeout_ms: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(ms) = timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder.build().map_err(from_reqwest)
}

/// Map a failed chat-completion HTTP response to a typed error.
///
/// - 429, or a body mentioning quota → [`Error::QuotaExceeded`]
/// - 401 → [`Error::AuthInvalid`]
/// - 403 → [`Error::AccessDenied`]
/// - anything else → [`Error::Provider`]
pub(crate) fn classify_chat_failure(provider: &str, status: u16, body: &str) -> Error {
    let message = format!("HTTP {} - {}", status, truncate(body, 500));
    let provider = provider.to_string();

    if status == 429 || body.to_ascii_lowercase().contains("quota") {
        return Error::QuotaExceeded { provider, message };
    }
    match status {
        401 => Error::AuthInvalid { provider, message },
        403 => Error::AccessDenied { provider, message },
        _ => Error::Provider { provider, message },
    }
}

/// Redact API key from URL for safe logging.
pub(crate) fn redact_url_key(url: &str) -> String {
    if let Some(idx) = url.find("key=") {
        let prefix = &url[..idx + 4];
        let rest = &url[idx + 4..];
        let end = rest.find('&').unwrap_or(rest.len());
        format!("{prefix}[REDACTED]{}", &rest[end..])
    } else {
        url.to_string()
    }
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
