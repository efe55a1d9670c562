//! Connection loop: connect, join the default namespace, forward status
//! events, reconnect with backoff.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use parkhub_app::ports::HistoryPublisher;
use parkhub_app::token::TokenCell;
use parkhub_domain::history::ParkingLotHistory;

use crate::config::SocketConfig;
use crate::error::SocketError;
use crate::packet::{self, EnginePacket, SocketPacket, DEFAULT_NAMESPACE};
use crate::reconnect::next_delay;

/// Read deadline until the handshake announces the server's own timings
/// (Engine.IO defaults: 25s interval plus 20s timeout).
const HANDSHAKE_LIVENESS: Duration = Duration::from_secs(45);

/// Keeps the real-time connection alive and republishes status events.
pub struct SocketIoListener<P> {
    config: SocketConfig,
    token: TokenCell,
    publisher: P,
}

impl<P> SocketIoListener<P>
where
    P: HistoryPublisher + Send + Sync + 'static,
{
    pub fn new(config: SocketConfig, token: TokenCell, publisher: P) -> Self {
        Self {
            config,
            token,
            publisher,
        }
    }

    /// Run the loop on a background task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<(), SocketError>> {
        tokio::spawn(self.run(cancel))
    }

    /// Run until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::InvalidUrl`] when the endpoint cannot be
    /// derived, and [`SocketError::Unauthorized`] when the server rejects the
    /// token. Every other failure is logged and retried.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), SocketError> {
        let endpoint = self.config.endpoint()?;
        let backoff = self.config.backoff();
        let mut delay = backoff.initial_delay;

        loop {
            let mut joined = false;
            let outcome = tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                outcome = self.session(&endpoint, &mut joined) => outcome,
            };

            match outcome {
                Ok(()) => tracing::info!(endpoint = %endpoint, "real-time connection closed"),
                Err(SocketError::Unauthorized(reason)) => {
                    tracing::error!(reason = %reason, "real-time connection rejected, not retrying");
                    return Err(SocketError::Unauthorized(reason));
                }
                Err(err) => tracing::warn!(error = %err, endpoint = %endpoint, "real-time connection failed"),
            }

            if joined {
                delay = backoff.initial_delay;
            }
            tracing::debug!(delay_ms = millis(delay), "reconnecting after delay");
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                () = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, &backoff);
        }
    }

    async fn session(&self, endpoint: &str, joined: &mut bool) -> Result<(), SocketError> {
        let (stream, _response) = connect_async(endpoint).await?;
        let (mut sink, mut stream) = stream.split();
        tracing::debug!(endpoint = %endpoint, "websocket connected");

        let mut liveness = HANDSHAKE_LIVENESS;
        loop {
            let Some(message) = tokio::time::timeout(liveness, stream.next())
                .await
                .map_err(|_| SocketError::PingTimeout(liveness))?
            else {
                return Ok(());
            };
            let text = match message? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(()),
                _ => continue,
            };

            match packet::decode_engine(&text)? {
                EnginePacket::Open(handshake) => {
                    tracing::debug!(
                        sid = %handshake.sid,
                        ping_interval = handshake.ping_interval,
                        ping_timeout = handshake.ping_timeout,
                        "engine.io open"
                    );
                    liveness = Duration::from_millis(
                        handshake.ping_interval.saturating_add(handshake.ping_timeout),
                    );
                    let token = self.token.get();
                    sink.send(Message::Text(packet::connect_frame(token.as_deref())))
                        .await?;
                }
                EnginePacket::Ping(data) => {
                    sink.send(Message::Text(packet::pong_frame(&data))).await?;
                }
                EnginePacket::Close => return Ok(()),
                EnginePacket::Message(payload) => match packet::decode_socket(&payload) {
                    Ok(packet) => {
                        if self.handle(packet, joined).await? {
                            return Ok(());
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "dropping malformed socket.io packet"),
                },
                EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
            }
        }
    }

    /// Returns `true` when the server ended the namespace session.
    async fn handle(&self, packet: SocketPacket, joined: &mut bool) -> Result<bool, SocketError> {
        match packet {
            SocketPacket::Connect { namespace, .. } if namespace == DEFAULT_NAMESPACE => {
                *joined = true;
                tracing::info!("real-time feed connected");
            }
            SocketPacket::ConnectError { data, .. } => {
                return Err(SocketError::Unauthorized(packet::connect_error_message(
                    data.as_ref(),
                )));
            }
            SocketPacket::Disconnect { namespace } if namespace == DEFAULT_NAMESPACE => {
                return Ok(true);
            }
            SocketPacket::Event {
                namespace,
                name,
                args,
                ..
            } if namespace == DEFAULT_NAMESPACE && name == self.config.event => {
                self.forward(args).await;
            }
            SocketPacket::Binary => tracing::debug!("ignoring binary packet"),
            other => tracing::trace!(packet = ?other, "ignoring packet"),
        }
        Ok(false)
    }

    async fn forward(&self, args: Vec<Value>) {
        let Some(payload) = args.into_iter().next() else {
            tracing::warn!(event = %self.config.event, "status event without payload");
            return;
        };
        let record: ParkingLotHistory = match serde_json::from_value(payload) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed status event");
                return;
            }
        };
        tracing::debug!(
            parking_lot_id = %record.parking_lot_id,
            history_id = %record.id,
            "status event received"
        );
        if let Err(err) = self.publisher.publish(record).await {
            tracing::warn!(error = %err, "failed to publish status event");
        }
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    use parkhub_app::status_bus::InProcessStatusBus;
    use parkhub_domain::parking_lot::ParkingLotStatus;

    use super::*;

    const HANDSHAKE: &str =
        r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

    fn config(port: u16) -> SocketConfig {
        SocketConfig {
            url: format!("http://127.0.0.1:{port}"),
            reconnect_initial_ms: 10,
            reconnect_max_ms: 50,
            ..SocketConfig::default()
        }
    }

    async fn next_text<S>(stream: &mut S) -> String
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match stream.next().await.unwrap().unwrap() {
                Message::Text(text) => return text,
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn should_forward_status_event_to_bus() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();

            sink.send(Message::Text(HANDSHAKE.to_string())).await.unwrap();
            let connect = next_text(&mut stream).await;
            sink.send(Message::Text(r#"40{"sid":"n1"}"#.to_string()))
                .await
                .unwrap();

            sink.send(Message::Text("2".to_string())).await.unwrap();
            let pong = next_text(&mut stream).await;

            let frame = packet::event_frame(
                "updateEstatus",
                &[json!({
                    "id": "h1",
                    "parkingLotId": "p1",
                    "status": "OPEN",
                    "availability": "MORE_THAN_FIVE",
                    "updatedAt": "2024-03-01T10:15:00Z"
                })],
            );
            sink.send(Message::Text(frame)).await.unwrap();
            // keep the socket open until the client goes away
            while let Some(Ok(_)) = stream.next().await {}
            (connect, pong)
        });

        let bus = Arc::new(InProcessStatusBus::new(8));
        let mut rx = bus.subscribe();
        let cancel = CancellationToken::new();
        let handle = SocketIoListener::new(config(port), TokenCell::with_token("jwt"), bus.clone())
            .spawn(cancel.clone());

        let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.parking_lot_id.as_str(), "p1");
        assert_eq!(record.status, ParkingLotStatus::Open);

        cancel.cancel();
        assert!(handle.await.unwrap().is_ok());

        let (connect, pong) = server.await.unwrap();
        assert_eq!(connect, r#"40{"token":"jwt"}"#);
        assert_eq!(pong, "3");
    }

    #[tokio::test]
    async fn should_ignore_other_events_and_malformed_payloads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            sink.send(Message::Text(HANDSHAKE.to_string())).await.unwrap();
            next_text(&mut stream).await;
            sink.send(Message::Text("40".to_string())).await.unwrap();
            for frame in [
                packet::event_frame("somethingElse", &[json!({"id": "x"})]),
                packet::event_frame("updateEstatus", &[json!({"id": "broken"})]),
                packet::event_frame(
                    "updateEstatus",
                    &[json!({
                        "id": "h2",
                        "parkingLotId": "p2",
                        "status": "CLOSED",
                        "availability": "NO_AVAILABILITY",
                        "updatedAt": "2024-03-01T10:15:00Z"
                    })],
                ),
            ] {
                sink.send(Message::Text(frame)).await.unwrap();
            }
            while let Some(Ok(_)) = stream.next().await {}
        });

        let bus = Arc::new(InProcessStatusBus::new(8));
        let mut rx = bus.subscribe();
        let cancel = CancellationToken::new();
        let handle =
            SocketIoListener::new(config(port), TokenCell::new(), bus.clone()).spawn(cancel.clone());

        let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id.as_str(), "h2");

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn should_stop_on_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            sink.send(Message::Text(HANDSHAKE.to_string())).await.unwrap();
            next_text(&mut stream).await;
            sink.send(Message::Text(r#"44{"message":"Invalid token"}"#.to_string()))
                .await
                .unwrap();
            while let Some(Ok(_)) = stream.next().await {}
        });

        let bus = Arc::new(InProcessStatusBus::new(8));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            SocketIoListener::new(config(port), TokenCell::with_token("bad"), bus)
                .run(CancellationToken::new()),
        )
        .await
        .unwrap();

        match result {
            Err(SocketError::Unauthorized(reason)) => assert_eq!(reason, "Invalid token"),
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_reconnect_after_server_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            // first connection: open then drop immediately
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            drop(ws);

            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            sink.send(Message::Text(HANDSHAKE.to_string())).await.unwrap();
            next_text(&mut stream).await;
            sink.send(Message::Text("40".to_string())).await.unwrap();
            let frame = packet::event_frame(
                "updateEstatus",
                &[json!({
                    "id": "h3",
                    "parkingLotId": "p3",
                    "status": "OPEN",
                    "availability": "LESS_THAN_FIVE",
                    "updatedAt": "2024-03-01T10:15:00Z"
                })],
            );
            sink.send(Message::Text(frame)).await.unwrap();
            while let Some(Ok(_)) = stream.next().await {}
        });

        let bus = Arc::new(InProcessStatusBus::new(8));
        let mut rx = bus.subscribe();
        let cancel = CancellationToken::new();
        let handle =
            SocketIoListener::new(config(port), TokenCell::new(), bus.clone()).spawn(cancel.clone());

        let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id.as_str(), "h3");

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn should_reconnect_when_server_stops_pinging() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            sink.send(Message::Text(
                r#"0{"sid":"s1","pingInterval":100,"pingTimeout":100}"#.to_string(),
            ))
            .await
            .unwrap();
            next_text(&mut stream).await;
            sink.send(Message::Text("40".to_string())).await.unwrap();

            // go silent without closing: the socket stays half-open
            let second = tokio::time::timeout(Duration::from_secs(2), listener.accept()).await;
            drop((sink, stream));
            second.is_ok()
        });

        let bus = Arc::new(InProcessStatusBus::new(8));
        let cancel = CancellationToken::new();
        let handle =
            SocketIoListener::new(config(port), TokenCell::new(), bus).spawn(cancel.clone());

        assert!(server.await.unwrap(), "no reconnect after the ping deadline");

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn should_return_when_cancelled_while_unreachable() {
        // bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let cancel = CancellationToken::new();
        let bus = Arc::new(InProcessStatusBus::new(8));
        let handle = SocketIoListener::new(config(port), TokenCell::new(), bus).spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn should_reject_invalid_url_before_connecting() {
        let config = SocketConfig {
            url: "ftp://nowhere".to_string(),
            ..SocketConfig::default()
        };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(
            SocketIoListener::new(config, TokenCell::new(), Arc::new(InProcessStatusBus::new(1)))
                .run(CancellationToken::new()),
        );
        assert!(matches!(result, Err(SocketError::InvalidUrl(_))));
    }
}
