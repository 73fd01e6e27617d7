use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use screenbridge_core::{PeerId, RelaySignal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Outbound queues of every open relay socket.
#[derive(Clone, Default)]
pub struct Connections {
    peers: Arc<DashMap<PeerId, mpsc::UnboundedSender<RelaySignal>>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<RelaySignal>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl SignalingOutput for Connections {
    fn send_signal(&self, peer_id: &PeerId, msg: RelaySignal) -> bool {
        let Some(peer) = self.peers.get(peer_id) else {
            warn!("Attempted to send signal to disconnected peer {}", peer_id);
            return false;
        };
        if let Err(e) = peer.send(msg) {
            error!("Failed to queue signal for {}: {}", peer_id, e);
            return false;
        }
        true
    }
}
