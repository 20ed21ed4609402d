//! WebSocket connection handler
//!
//! One receive loop per accepted connection. Routes inbound messages to
//! registration, arbitration, or admin handling, forwards broadcast
//! snapshots queued by any connection's mutation, and drives the
//! transport keepalive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use crate::error::SessionError;
use crate::server::protocol::{BuzzRejectReason, ClientMessage, ServerMessage};
use crate::server::session::Session;

/// Transport keepalive settings.
#[derive(Debug, Clone, Copy)]
pub struct KeepaliveConfig {
    /// How often to send a transport ping.
    pub interval: Duration,
    /// Grace period beyond the interval before a silent peer is
    /// declared dead.
    pub timeout: Duration,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(20),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Handle a single WebSocket connection until it closes.
pub async fn handle_connection(
    stream: TcpStream,
    session: Arc<Session>,
    keepalive: KeepaliveConfig,
) {
    let addr = stream.peer_addr().ok();
    tracing::info!("new connection from {:?}", addr);

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let mut conn = ConnectionState::new(ws_stream, session, keepalive);
    conn.run().await;

    tracing::info!("connection closed from {:?}", addr);
}

/// State for a single connection
struct ConnectionState {
    ws: WebSocketStream<TcpStream>,
    session: Arc<Session>,
    client_id: String,
    /// Private outbound queue; broadcasts land here from whichever
    /// connection task triggered them.
    outbound_rx: mpsc::UnboundedReceiver<Message>,
    keepalive: KeepaliveConfig,
    last_seen: Instant,
}

impl ConnectionState {
    fn new(
        ws: WebSocketStream<TcpStream>,
        session: Arc<Session>,
        keepalive: KeepaliveConfig,
    ) -> Self {
        let (tx, outbound_rx) = mpsc::unbounded_channel();
        let client_id = session.connect(tx);
        Self {
            ws,
            session,
            client_id,
            outbound_rx,
            keepalive,
            last_seen: Instant::now(),
        }
    }

    async fn run(&mut self) {
        let mut ping_tick = tokio::time::interval(self.keepalive.interval);

        loop {
            tokio::select! {
                // Inbound WebSocket frames
                msg = self.ws.next() => {
                    self.last_seen = Instant::now();
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_message(&text).await {
                                tracing::error!("reply to {} failed: {}", self.client_id, e);
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("client {} requested close", self.client_id);
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = self.ws.send(Message::Pong(data)).await;
                        }
                        Some(Err(e)) => {
                            tracing::error!("WebSocket error: {}", e);
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }

                // Broadcast snapshots queued by any state-changing event
                out = self.outbound_rx.recv() => {
                    match out {
                        Some(msg) => {
                            if let Err(e) = self.ws.send(msg).await {
                                tracing::error!("send to {} failed: {}", self.client_id, e);
                                break;
                            }
                        }
                        // Sender side dropped: we were pruned during a broadcast.
                        None => break,
                    }
                }

                // Server-initiated keepalive
                _ = ping_tick.tick() => {
                    if self.last_seen.elapsed() > self.keepalive.interval + self.keepalive.timeout {
                        tracing::warn!("client {} missed keepalive, dropping", self.client_id);
                        break;
                    }
                    if self.ws.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        self.session.disconnect(&self.client_id);
    }

    /// Returns `Err` only when replying to the client fails; malformed
    /// input is logged and dropped without closing the connection.
    async fn handle_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("invalid message from {}: {}", self.client_id, e);
                return Ok(());
            }
        };

        match msg {
            ClientMessage::Register {
                team_name,
                is_admin,
            } => match self.session.register(&self.client_id, team_name, is_admin) {
                Ok(role) => {
                    let reply = ServerMessage::Registered {
                        client_id: self.client_id.clone(),
                        role: role.label().to_string(),
                        team_name: role.team_name().map(str::to_string),
                    };
                    self.send(&reply).await?;
                }
                Err(e) => self.send_error(&e).await?,
            },

            ClientMessage::Buzz => match self.session.buzz(&self.client_id) {
                Ok(order_index) => {
                    tracing::debug!(
                        "buzz from {} recorded at index {}",
                        self.client_id,
                        order_index
                    );
                }
                Err(SessionError::BuzzLocked) => {
                    self.send(&ServerMessage::BuzzRejected {
                        reason: BuzzRejectReason::Locked,
                    })
                    .await?;
                }
                Err(SessionError::AlreadyBuzzed { .. }) => {
                    self.send(&ServerMessage::BuzzRejected {
                        reason: BuzzRejectReason::AlreadyBuzzed,
                    })
                    .await?;
                }
                Err(e) => self.send_error(&e).await?,
            },

            ClientMessage::AdminCommand { action } => {
                if let Err(e) = self.session.admin_command(&self.client_id, &action) {
                    self.send_error(&e).await?;
                }
            }

            ClientMessage::Ping => {
                self.send(&ServerMessage::Pong).await?;
            }
        }

        Ok(())
    }

    async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()> {
        let json = serde_json::to_string(msg)?;
        self.ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn send_error(&mut self, err: &SessionError) -> anyhow::Result<()> {
        self.send(&ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        })
        .await
    }
}
