//! Socket.IO adapter error types.

use tokio_tungstenite::tungstenite;

/// Errors raised by the real-time connection.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The configured URL cannot be turned into a WebSocket endpoint.
    #[error("invalid real-time URL {0:?}")]
    InvalidUrl(String),

    /// Connecting, reading, or writing the WebSocket failed.
    #[error("websocket error")]
    WebSocket(#[source] Box<tungstenite::Error>),

    /// The server sent a frame that is not a valid packet.
    #[error("malformed packet")]
    Packet(#[from] PacketError),

    /// Nothing arrived within the ping interval plus ping timeout.
    #[error("no ping from server within {0:?}")]
    PingTimeout(std::time::Duration),

    /// The server refused the namespace connection (missing or invalid token).
    #[error("connection rejected: {0}")]
    Unauthorized(String),
}

impl From<tungstenite::Error> for SocketError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Details about why a text frame could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,

    #[error("unknown {layer} packet type {kind:?}")]
    UnknownType { layer: &'static str, kind: char },

    #[error("invalid open handshake")]
    Handshake(#[source] serde_json::Error),

    #[error("invalid packet payload")]
    Payload(#[source] serde_json::Error),

    #[error("event packet without a name")]
    MissingEventName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_type() {
        let err = PacketError::UnknownType {
            layer: "engine.io",
            kind: '9',
        };
        assert_eq!(err.to_string(), "unknown engine.io packet type '9'");
    }

    #[test]
    fn should_display_ping_timeout() {
        let err = SocketError::PingTimeout(std::time::Duration::from_millis(200));
        assert_eq!(err.to_string(), "no ping from server within 200ms");
    }

    #[test]
    fn should_display_rejection_reason() {
        let err = SocketError::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "connection rejected: invalid token");
    }
}
