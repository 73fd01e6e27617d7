use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use screenbridge_core::{ClientSignal, PeerId, RelaySignal};
use screenbridge_server::{RelayConfig, RelayServer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::signal_helpers::SIGNAL_TIMEOUT_MS;

/// Starts a relay on an ephemeral local port.
pub async fn spawn_relay(config: RelayConfig) -> Result<(SocketAddr, JoinHandle<()>)> {
    let server = RelayServer::bind(config.bind(SocketAddr::from(([127, 0, 0, 1], 0)))).await?;
    let addr = server.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!("[TestRelay] stopped: {:#}", e);
        }
    });

    Ok((addr, handle))
}

/// A participant speaking the relay protocol over a real WebSocket.
pub struct TestClient {
    /// The id the relay assigned in its welcome.
    pub peer_id: PeerId,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connects and consumes the welcome and ICE configuration.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let url = format!("ws://{}/ws", addr);
        let (ws, _response) = tokio_tungstenite::connect_async(&url)
            .await
            .context("WebSocket connect failed")?;

        let mut client = Self {
            peer_id: PeerId::new(),
            ws,
        };

        match client.recv().await? {
            RelaySignal::Welcome { peer_id } => client.peer_id = peer_id,
            other => anyhow::bail!("Expected welcome, got {:?}", other),
        }
        match client.recv().await? {
            RelaySignal::IceConfig { .. } => {}
            other => anyhow::bail!("Expected ICE config, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, signal: &ClientSignal) -> Result<()> {
        let json = serde_json::to_string(signal)?;
        self.send_raw(&json).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws
            .send(Message::Text(text.to_owned().into()))
            .await
            .context("Failed to send frame")
    }

    /// Next relay message, ignoring control frames.
    pub async fn recv(&mut self) -> Result<RelaySignal> {
        let timeout = Duration::from_millis(SIGNAL_TIMEOUT_MS);

        loop {
            let frame = tokio::time::timeout(timeout, self.ws.next())
                .await
                .context("Timeout waiting for relay message")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).context("Bad RelaySignal");
                }
                Some(Ok(Message::Close(_))) | None => anyhow::bail!("Socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("Socket error"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await.context("Failed to close socket")
    }
}
