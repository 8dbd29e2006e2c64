//! Runtime configuration.

use crate::error::{EditorError, Result};
use std::net::SocketAddr;

/// Primary environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Checked when [`API_KEY_ENV`] is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default request body limit (20 MiB, the Gemini inline-data ceiling).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default cap on live browser sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Resolves the API key from an explicit value or the given variable lookup.
///
/// Empty values count as unset.
pub fn resolve_api_key<F>(explicit: Option<String>, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .into_iter()
        .chain(lookup(API_KEY_ENV))
        .chain(lookup(FALLBACK_API_KEY_ENV))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            EditorError::Config(format!(
                "{API_KEY_ENV} environment variable not set (nor {FALLBACK_API_KEY_ENV})"
            ))
        })
}

/// Resolves the API key from the process environment.
pub fn api_key_from_env() -> Result<String> {
    resolve_api_key(None, |name| std::env::var(name).ok())
}

/// Settings for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Live sessions kept before the least recently seen is evicted.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}
