use crate::room::{Room, RoomError};
use rand::Rng;
use screenbridge_core::{CODE_RANGE, PeerId, SharingCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// In-memory registry of live rooms keyed by sharing code.
///
/// Not synchronized on its own: `RoomRegistry` owns it together with the
/// `PeerIndex` behind a single lock.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<SharingCode, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a room for `host` under a code no live room currently uses.
    pub fn create_room<R: Rng + ?Sized>(
        &mut self,
        host: PeerId,
        now: Instant,
        rng: &mut R,
    ) -> SharingCode {
        loop {
            let Ok(code) = SharingCode::from_number(rng.gen_range(CODE_RANGE)) else {
                continue;
            };
            if self.rooms.contains_key(&code) {
                debug!("Code collision on {}, retrying", code);
                continue;
            }

            info!("Creating new room: {}", code);
            self.rooms
                .insert(code.clone(), Room::new(code.clone(), host, now));
            return code;
        }
    }

    /// Fills the viewer slot and returns the host, or fails without touching
    /// the room.
    pub fn join_room(&mut self, code: &SharingCode, viewer: PeerId) -> Result<PeerId, RoomError> {
        let room = self.rooms.get_mut(code).ok_or(RoomError::NotFound)?;
        if room.viewer.is_some() || room.host == viewer {
            return Err(RoomError::RoomFull);
        }
        room.viewer = Some(viewer);
        Ok(room.host)
    }

    /// Empties the viewer slot only if `viewer` still occupies it. Returns the
    /// host of the room on success.
    pub fn clear_viewer(&mut self, code: &SharingCode, viewer: PeerId) -> Option<PeerId> {
        let room = self.rooms.get_mut(code)?;
        if room.viewer != Some(viewer) {
            return None;
        }
        room.viewer = None;
        Some(room.host)
    }

    /// Deletes the room only if `host` is still its host.
    pub fn remove_hosted(&mut self, code: &SharingCode, host: PeerId) -> Option<Room> {
        if self.rooms.get(code)?.host != host {
            return None;
        }
        self.rooms.remove(code)
    }

    /// Removes and returns every room older than `max_age`.
    pub fn sweep_expired(&mut self, now: Instant, max_age: Duration) -> Vec<Room> {
        let expired: Vec<SharingCode> = self
            .rooms
            .values()
            .filter(|room| room.is_expired(now, max_age))
            .map(|room| room.code.clone())
            .collect();

        expired
            .iter()
            .filter_map(|code| self.rooms.remove(code))
            .collect()
    }

    pub fn get(&self, code: &SharingCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn contains(&self, code: &SharingCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
