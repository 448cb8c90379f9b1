//! HTTP helpers shared by the store and insight clients.

use regex::Regex;

/// Maximum characters of an upstream error body kept in errors and logs.
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Failure reading an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Upstream responded with a non-2xx status.
    #[error("non-success status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `HttpError::Request` on transport failure, `HttpError::Status` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, HttpError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            body: sanitize_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact key-like tokens and truncate an error body.
pub fn sanitize_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sb_(publishable|secret)_[A-Za-z0-9_\-]{10,}",
        r"eyJ[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}",
        r"AIza[A-Za-z0-9_\-]{30,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
