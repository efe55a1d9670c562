//! Real-time connection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::SocketError;
use crate::reconnect::ReconnectConfig;

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Configuration for the Socket.IO status feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Server URL. `http(s)` is mapped to `ws(s)`; the Socket.IO path is
    /// appended unless already present.
    pub url: String,
    /// Name of the status event.
    pub event: String,
    /// Delay before the first reconnection attempt, in milliseconds.
    pub reconnect_initial_ms: u64,
    /// Upper bound on the reconnection delay, in milliseconds.
    pub reconnect_max_ms: u64,
    /// Whether the live feed is started at all.
    pub enabled: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            event: "updateEstatus".to_string(),
            reconnect_initial_ms: 1_000,
            reconnect_max_ms: 30_000,
            enabled: true,
        }
    }
}

impl SocketConfig {
    /// WebSocket endpoint of the Engine.IO transport.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::InvalidUrl`] for schemes other than
    /// `ws`, `wss`, `http`, and `https`.
    pub fn endpoint(&self) -> Result<String, SocketError> {
        let url = self.url.trim();
        let rest = if let Some(rest) = url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if url.starts_with("ws://") || url.starts_with("wss://") {
            url.to_string()
        } else {
            return Err(SocketError::InvalidUrl(self.url.clone()));
        };
        if rest.contains("/socket.io") {
            return Ok(rest);
        }
        Ok(format!("{}{SOCKET_IO_PATH}", rest.trim_end_matches('/')))
    }

    #[must_use]
    pub fn backoff(&self) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(self.reconnect_initial_ms),
            max_delay: Duration::from_millis(self.reconnect_max_ms),
            ..ReconnectConfig::default()
        }
    }
}
