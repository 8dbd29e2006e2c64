//! Error types for image editing.

use std::time::Duration;

/// Longest error body forwarded to callers, in characters.
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Errors that can occur while editing an image.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized error message.
        message: String,
    },

    /// Quota or rate limit exceeded.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Message from the service, e.g. which quota was hit.
        message: String,
        /// Delay from the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Billing is not enabled for the key's project.
    #[error("billing error: {0}")]
    Billing(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an input file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The model answered without any inline image part.
    #[error("model did not return image data")]
    NoImageData,

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EditorError {
    /// Returns the retry delay suggested by the service, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for image editing operations.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Reads a `Retry-After` header expressed in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Reduces an error body to something fit for a user-facing message.
///
/// Google APIs wrap errors as `{"error": {"message": ...}}`; the inner message
/// is preferred. Anything else is trimmed and truncated.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| text.trim().to_owned());

    if message.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        format!("{truncated}...")
    } else {
        message
    }
}
