use crate::config::RelayClientConfig;
use crate::relay::{RelayEvent, RelaySink};
use futures::{SinkExt, StreamExt};
use screenbridge_core::{ClientSignal, RelaySignal};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Cloneable sender half handed to the negotiator.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<ClientSignal>,
}

impl RelaySink for RelayHandle {
    fn send(&self, signal: ClientSignal) -> bool {
        self.tx.send(signal).is_ok()
    }
}

/// WebSocket connection to the relay with automatic reconnection.
pub struct RelayClient;

impl RelayClient {
    /// Starts the connection loop. It stops once every [`RelayHandle`] or the
    /// event receiver is dropped.
    pub fn spawn(
        config: RelayClientConfig,
    ) -> (RelayHandle, mpsc::Receiver<RelayEvent>, JoinHandle<()>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(256);

        let task = tokio::spawn(run_relay_client(config, out_rx, event_tx));
        (RelayHandle { tx: out_tx }, event_rx, task)
    }
}

enum SessionResult {
    Shutdown,
    Disconnected(String),
}

async fn run_relay_client(
    config: RelayClientConfig,
    mut out_rx: mpsc::UnboundedReceiver<ClientSignal>,
    event_tx: mpsc::Sender<RelayEvent>,
) {
    let mut backoff = config.initial_backoff;

    loop {
        info!(url = %config.url, "Connecting to relay...");

        match connect_async(config.url.as_str()).await {
            Ok((ws, _)) => {
                backoff = config.initial_backoff;

                // Anything queued while offline addressed connections that no
                // longer exist.
                let mut stale = 0usize;
                while out_rx.try_recv().is_ok() {
                    stale += 1;
                }
                if stale > 0 {
                    debug!(stale, "Discarded signals queued while disconnected");
                }

                if event_tx.send(RelayEvent::Connected).await.is_err() {
                    return;
                }

                match relay_session(ws, &mut out_rx, &event_tx).await {
                    SessionResult::Shutdown => {
                        info!("Relay client shutting down");
                        return;
                    }
                    SessionResult::Disconnected(reason) => {
                        warn!(reason = %reason, "Relay connection lost");
                        if event_tx.send(RelayEvent::Disconnected).await.is_err() {
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to relay");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = event_tx.closed() => return,
        }

        backoff = (backoff * 2).min(config.max_backoff);
    }
}

async fn relay_session(
    ws: RelayStream,
    out_rx: &mut mpsc::UnboundedReceiver<ClientSignal>,
    event_tx: &mpsc::Sender<RelayEvent>,
) -> SessionResult {
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            outbound = out_rx.recv() => {
                let Some(signal) = outbound else {
                    let _ = sink.close().await;
                    return SessionResult::Shutdown;
                };
                let json = match serde_json::to_string(&signal) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode ClientSignal: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    return SessionResult::Disconnected(format!("send failed: {e}"));
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<RelaySignal>(text.as_str()) {
                            Ok(signal) => {
                                if event_tx.send(RelayEvent::Signal(signal)).await.is_err() {
                                    return SessionResult::Shutdown;
                                }
                            }
                            Err(e) => warn!("Invalid RelaySignal: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return SessionResult::Disconnected("closed by relay".into());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return SessionResult::Disconnected(e.to_string()),
                }
            }
        }
    }
}
