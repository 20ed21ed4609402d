//! Buzzer Daemon Binary
//!
//! A WebSocket server coordinating a quiz buzz-in session: team clients
//! and an admin client share a synchronized view of lock status and
//! buzz order.
//!
//! # Usage
//!
//! ```bash
//! buzzer-daemon --port 8765
//! buzzer-daemon --host 0.0.0.0 --port 8765   # LAN play
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use quiz_buzzer::server::{handle_connection, KeepaliveConfig, Session};

/// Quiz buzzer session daemon
#[derive(Parser, Debug)]
#[command(name = "buzzer-daemon")]
#[command(about = "WebSocket buzz-in coordinator for quiz games")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8765")]
    port: u16,

    /// Host to bind to (use 0.0.0.0 for LAN play)
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Seconds between transport keepalive pings
    #[arg(long, default_value = "20")]
    ping_interval: u64,

    /// Seconds of grace after a missed ping before dropping a client
    #[arg(long, default_value = "10")]
    ping_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quiz_buzzer=info".parse().unwrap())
                .add_directive("buzzer_daemon=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let keepalive = KeepaliveConfig {
        interval: Duration::from_secs(args.ping_interval),
        timeout: Duration::from_secs(args.ping_timeout),
    };

    // The one shared session; every connection task gets a handle.
    let session = Arc::new(Session::new());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("buzzer daemon listening on ws://{}", addr);
    tracing::info!("connect team and admin clients to start a round");

    // Accept connections
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!("accepted connection from {}", peer);
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    handle_connection(stream, session, keepalive).await;
                });
            }
            Err(e) => {
                tracing::error!("failed to accept connection: {}", e);
            }
        }
    }
}
