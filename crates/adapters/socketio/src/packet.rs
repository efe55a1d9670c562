//! Engine.IO v4 / Socket.IO v5 text packet codec.
//!
//! Only what the WebSocket transport needs: one packet per text frame, no
//! payload batching, no binary attachments.

use serde::Deserialize;
use serde_json::Value;

use crate::error::PacketError;

/// The default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Engine.IO open handshake (`0{...}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Transport-level packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

/// Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        name: String,
        args: Vec<Value>,
        ack: Option<u64>,
    },
    Ack {
        namespace: String,
        id: Option<u64>,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
    /// Binary event or ack; attachments are not supported.
    Binary,
}

/// Decode one Engine.IO text frame.
///
/// # Errors
///
/// Returns [`PacketError`] for an empty frame, an unknown type, or an
/// invalid open handshake.
pub fn decode_engine(frame: &str) -> Result<EnginePacket, PacketError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let rest = chars.as_str();
    match kind {
        '0' => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(PacketError::Handshake),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_string())),
        '3' => Ok(EnginePacket::Pong(rest.to_string())),
        '4' => Ok(EnginePacket::Message(rest.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(PacketError::UnknownType {
            layer: "engine.io",
            kind: other,
        }),
    }
}

/// Decode the Socket.IO packet inside an Engine.IO message.
///
/// Layout: `<type>[/<namespace>,][<ack id>][<json>]`.
///
/// # Errors
///
/// Returns [`PacketError`] for an empty payload, an unknown type, invalid
/// JSON, or an event without a name.
pub fn decode_socket(payload: &str) -> Result<SocketPacket, PacketError> {
    let mut chars = payload.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    if matches!(kind, '5' | '6') {
        return Ok(SocketPacket::Binary);
    }
    let mut rest = chars.as_str();

    let mut namespace = DEFAULT_NAMESPACE.to_string();
    if rest.starts_with('/') {
        let (nsp, tail) = rest.split_once(',').unwrap_or((rest, ""));
        namespace = nsp.to_string();
        rest = tail;
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack = rest[..digits].parse::<u64>().ok();
    rest = &rest[digits..];

    let data = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(rest).map_err(PacketError::Payload)?)
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let Some(Value::Array(mut items)) = data else {
                return Err(PacketError::MissingEventName);
            };
            if items.is_empty() {
                return Err(PacketError::MissingEventName);
            }
            let Value::String(name) = items.remove(0) else {
                return Err(PacketError::MissingEventName);
            };
            Ok(SocketPacket::Event {
                namespace,
                name,
                args: items,
                ack,
            })
        }
        '3' => Ok(SocketPacket::Ack {
            namespace,
            id: ack,
            args: match data {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            },
        }),
        '4' => Ok(SocketPacket::ConnectError { namespace, data }),
        other => Err(PacketError::UnknownType {
            layer: "socket.io",
            kind: other,
        }),
    }
}

/// `40` connect frame for the default namespace, with the auth token when
/// one is available.
#[must_use]
pub fn connect_frame(token: Option<&str>) -> String {
    match token {
        Some(token) => format!("40{}", serde_json::json!({ "token": token })),
        None => "40".to_string(),
    }
}

/// Pong answering an Engine.IO ping, echoing its probe data.
#[must_use]
pub fn pong_frame(ping: &str) -> String {
    format!("3{ping}")
}

/// `42` event frame for the default namespace.
#[must_use]
pub fn event_frame(name: &str, args: &[Value]) -> String {
    let mut items = Vec::with_capacity(args.len() + 1);
    items.push(Value::String(name.to_string()));
    items.extend(args.iter().cloned());
    format!("42{}", Value::Array(items))
}

/// Human-readable reason of a connect error payload.
#[must_use]
pub fn connect_error_message(data: Option<&Value>) -> String {
    data.and_then(|d| d.get("message"))
        .and_then(Value::as_str)
        .or_else(|| data.and_then(Value::as_str))
        .unwrap_or("connection refused")
        .to_string()
}
