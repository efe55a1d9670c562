//! REST client configuration.

use serde::Deserialize;

/// Configuration for the backend REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL every request path is joined onto (e.g. `https://api.example.com/api`).
    pub base_url: String,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}
