use crate::config::RelayConfig;
use crate::room::{Departure, ExpiredRoom, RoomError, RoomRegistry};
use crate::signaling::SignalingOutput;
use screenbridge_core::{ClientSignal, PeerId, RelaySignal, SharingCode};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

struct RelayInner {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
    config: RelayConfig,
}

/// Per-message logic of the rendezvous relay: pairs hosts and viewers by
/// code and forwards negotiation payloads between the paired connections.
#[derive(Clone)]
pub struct SignalingRelay {
    inner: Arc<RelayInner>,
}

impl SignalingRelay {
    pub fn new(config: RelayConfig, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                registry: RoomRegistry::new(),
                output,
                config,
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Greets a freshly opened connection with its id and the ICE servers.
    pub fn welcome(&self, peer_id: PeerId) {
        self.send(&peer_id, RelaySignal::Welcome { peer_id });
        self.send(
            &peer_id,
            RelaySignal::IceConfig {
                ice_servers: self.inner.config.ice_servers.clone(),
            },
        );
    }

    /// Parses one raw frame and handles it. Malformed frames get an error
    /// reply and change nothing.
    pub async fn handle_text(&self, from: PeerId, text: &str) {
        match serde_json::from_str::<ClientSignal>(text) {
            Ok(signal) => self.handle_message(from, signal).await,
            Err(e) => {
                warn!("Invalid ClientSignal from {}: {}", from, e);
                self.send(
                    &from,
                    RelaySignal::Error {
                        message: format!("Malformed message: {e}"),
                    },
                );
            }
        }
    }

    pub async fn handle_message(&self, from: PeerId, signal: ClientSignal) {
        match signal {
            ClientSignal::RequestCode => self.request_code(from).await,
            ClientSignal::Join { code } => self.join(from, &code).await,
            ClientSignal::Offer { target, sdp } => {
                self.forward(from, target, RelaySignal::Offer { sender: from, sdp });
            }
            ClientSignal::Answer { target, sdp } => {
                self.forward(from, target, RelaySignal::Answer { sender: from, sdp });
            }
            ClientSignal::Candidate { target, candidate } => {
                self.forward(
                    from,
                    target,
                    RelaySignal::Candidate {
                        sender: from,
                        candidate,
                    },
                );
            }
            ClientSignal::Leave => {
                info!("Peer {} left its room", from);
                self.handle_disconnect(from).await;
            }
        }
    }

    /// Cleans up after a closed connection. Idempotent: a second call finds
    /// nothing bound and does nothing.
    pub async fn handle_disconnect(&self, peer_id: PeerId) {
        let departure = self.inner.registry.depart(peer_id).await;
        self.notify_departure(peer_id, departure);
    }

    /// Destroys expired rooms and tells their members. Returns how many rooms
    /// were removed.
    pub async fn sweep_expired(&self, now: Instant) -> usize {
        let expired = self
            .inner
            .registry
            .sweep_expired(now, self.inner.config.room_max_age)
            .await;

        for ExpiredRoom { code, host, viewer } in &expired {
            self.send(host, RelaySignal::RoomExpired { code: code.clone() });
            if let Some(viewer) = viewer {
                self.send(viewer, RelaySignal::RoomExpired { code: code.clone() });
            }
        }

        expired.len()
    }

    async fn request_code(&self, from: PeerId) {
        let (code, previous) = self.inner.registry.open_room(from).await;
        self.notify_departure(from, previous);

        info!("Peer {} hosts room {}", from, code);
        self.send(
            &from,
            RelaySignal::CodeReply {
                success: true,
                code: Some(code),
            },
        );
    }

    async fn join(&self, from: PeerId, raw_code: &str) {
        let result = match SharingCode::parse(raw_code) {
            Ok(code) => self
                .inner
                .registry
                .pair_viewer(&code, from)
                .await
                .map(|pairing| (code, pairing)),
            Err(_) => Err(RoomError::NotFound),
        };

        match result {
            Ok((code, pairing)) => {
                self.notify_departure(from, pairing.previous);
                info!("Peer {} joined room {} as viewer", from, code);

                self.send(&pairing.host, RelaySignal::ViewerArrived { viewer_id: from });
                self.send(&from, RelaySignal::join_accepted(pairing.host));
            }
            Err(e) => {
                info!("Peer {} failed to join {:?}: {}", from, raw_code, e);
                self.send(&from, RelaySignal::join_rejected(e.to_string()));
            }
        }
    }

    fn forward(&self, from: PeerId, target: PeerId, msg: RelaySignal) {
        debug!("Forwarding negotiation message {} -> {}", from, target);
        if !self.inner.output.send_signal(&target, msg) {
            warn!("Dropped negotiation message from {} to unknown {}", from, target);
        }
    }

    fn notify_departure(&self, peer_id: PeerId, departure: Departure) {
        match departure {
            Departure::Unbound => debug!("Peer {} was not in a room", peer_id),
            Departure::Host { viewer, .. } => {
                if let Some(viewer) = viewer {
                    self.send(&viewer, RelaySignal::HostDisconnected);
                }
            }
            Departure::Viewer { host, .. } => {
                if let Some(host) = host {
                    self.send(&host, RelaySignal::ViewerDisconnected);
                }
            }
        }
    }

    fn send(&self, peer_id: &PeerId, msg: RelaySignal) {
        self.inner.output.send_signal(peer_id, msg);
    }
}
