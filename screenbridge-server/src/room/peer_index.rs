use screenbridge_core::{PeerId, Role, SharingCode};
use std::collections::HashMap;

/// Room membership of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub code: SharingCode,
    pub role: Role,
}

/// Connection id -> room membership, so a closing socket resolves to its room
/// without scanning.
#[derive(Debug, Default)]
pub struct PeerIndex {
    peers: HashMap<PeerId, PeerRecord>,
}

impl PeerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, peer_id: PeerId, code: SharingCode, role: Role) {
        self.peers.insert(peer_id, PeerRecord { code, role });
    }

    pub fn lookup(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    pub fn unbind(&mut self, peer_id: &PeerId) -> Option<PeerRecord> {
        self.peers.remove(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
