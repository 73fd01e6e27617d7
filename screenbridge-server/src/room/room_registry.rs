use crate::room::{PeerIndex, PeerRecord, Room, RoomError, RoomState, RoomStore};
use screenbridge_core::{PeerId, Role, SharingCode};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What a connection left behind when it departed its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The connection was not a member of any room.
    Unbound,
    /// A host left; its room is gone and `viewer` (if any) was unbound.
    Host {
        code: SharingCode,
        viewer: Option<PeerId>,
    },
    /// A viewer left; the room stays open for `host`.
    Viewer {
        code: SharingCode,
        host: Option<PeerId>,
    },
}

/// Successful join of a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub host: PeerId,
    /// Membership the viewer gave up to join.
    pub previous: Departure,
}

/// A room removed by the expiry sweep, with the members that were unbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredRoom {
    pub code: SharingCode,
    pub host: PeerId,
    pub viewer: Option<PeerId>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    rooms: RoomStore,
    peers: PeerIndex,
}

/// `RoomStore` and `PeerIndex` behind one lock, so every change to a pairing
/// updates both in the same critical section.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    inner: Mutex<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh room hosted by `host`. A connection that already
    /// belonged to a room departs it first.
    pub async fn open_room(&self, host: PeerId) -> (SharingCode, Departure) {
        let mut inner = self.inner.lock().await;

        let previous = inner.depart(host);
        let code = inner
            .rooms
            .create_room(host, Instant::now(), &mut rand::thread_rng());
        inner.peers.bind(host, code.clone(), Role::Host);

        (code, previous)
    }

    /// Seats `viewer` in the room behind `code`. Fails without any change if
    /// the room is missing or occupied by someone else. A viewer already
    /// seated there is paired again as is.
    pub async fn pair_viewer(
        &self,
        code: &SharingCode,
        viewer: PeerId,
    ) -> Result<Pairing, RoomError> {
        let mut inner = self.inner.lock().await;

        let room = inner.rooms.get(code).ok_or(RoomError::NotFound)?;
        if room.host == viewer {
            return Err(RoomError::RoomFull);
        }
        match room.state() {
            RoomState::Paired if room.viewer == Some(viewer) => {
                debug!("Viewer {} rejoined room {}", viewer, code);
                return Ok(Pairing {
                    host: room.host,
                    previous: Departure::Unbound,
                });
            }
            RoomState::Paired => return Err(RoomError::RoomFull),
            RoomState::HasHost => {}
        }

        let previous = inner.depart(viewer);
        let host = inner.rooms.join_room(code, viewer)?;
        inner.peers.bind(viewer, code.clone(), Role::Viewer);

        Ok(Pairing { host, previous })
    }

    /// Removes `peer_id` from whatever room it belongs to. Safe to call any
    /// number of times.
    pub async fn depart(&self, peer_id: PeerId) -> Departure {
        self.inner.lock().await.depart(peer_id)
    }

    /// Destroys every room older than `max_age` and unbinds its members.
    pub async fn sweep_expired(&self, now: Instant, max_age: Duration) -> Vec<ExpiredRoom> {
        let mut inner = self.inner.lock().await;

        let expired = inner.rooms.sweep_expired(now, max_age);
        expired
            .into_iter()
            .map(|room| {
                inner.peers.unbind(&room.host);
                if let Some(viewer) = room.viewer {
                    inner.peers.unbind(&viewer);
                }
                info!("Room {} expired", room.code);
                ExpiredRoom {
                    code: room.code,
                    host: room.host,
                    viewer: room.viewer,
                }
            })
            .collect()
    }

    pub async fn lookup(&self, peer_id: &PeerId) -> Option<PeerRecord> {
        self.inner.lock().await.peers.lookup(peer_id).cloned()
    }

    pub async fn room(&self, code: &SharingCode) -> Option<Room> {
        self.inner.lock().await.rooms.get(code).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    pub async fn peer_count(&self) -> usize {
        self.inner.lock().await.peers.len()
    }
}

impl RegistryInner {
    fn depart(&mut self, peer_id: PeerId) -> Departure {
        let Some(record) = self.peers.unbind(&peer_id) else {
            return Departure::Unbound;
        };

        match record.role {
            Role::Host => {
                let viewer = match self.rooms.remove_hosted(&record.code, peer_id) {
                    Some(room) => room.viewer,
                    None => {
                        warn!(
                            "Host {} was bound to missing room {}",
                            peer_id, record.code
                        );
                        None
                    }
                };
                if let Some(viewer) = viewer {
                    self.peers.unbind(&viewer);
                }
                info!("Host {} left, room {} destroyed", peer_id, record.code);
                Departure::Host {
                    code: record.code,
                    viewer,
                }
            }
            Role::Viewer => {
                let host = self.rooms.clear_viewer(&record.code, peer_id);
                if host.is_none() {
                    warn!(
                        "Viewer {} was not seated in room {}",
                        peer_id, record.code
                    );
                }
                info!("Viewer {} left room {}", peer_id, record.code);
                Departure::Viewer {
                    code: record.code,
                    host,
                }
            }
        }
    }
}
