//! # parkhub-adapter-socketio
//!
//! Real-time adapter: keeps a Socket.IO connection to the backend and
//! republishes every status event on the in-process status bus.
//!
//! ## How it works
//!
//! Socket.IO v5 runs on top of Engine.IO v4. Only the WebSocket transport is
//! used, so every packet is one text frame:
//!
//! | Frame | Meaning |
//! |-------|---------|
//! | `0{...}` | Engine.IO open, JSON handshake |
//! | `2` / `3` | ping / pong |
//! | `40{"token":...}` | Socket.IO connect to the default namespace |
//! | `42["updateEstatus",{...}]` | event with its JSON arguments |
//! | `44{"message":...}` | connect error (token rejected) |
//!
//! Dropped connections are retried with exponential backoff until the
//! cancellation token fires. A connect error is an authorization failure and
//! is not retried.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `parkhub-app` and `parkhub-domain`.

mod config;
mod error;
mod listener;
pub mod packet;
pub mod reconnect;

pub use config::SocketConfig;
pub use error::{PacketError, SocketError};
pub use listener::SocketIoListener;
