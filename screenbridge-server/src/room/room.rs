use screenbridge_core::{PeerId, SharingCode};
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle stage of a live room. A destroyed room is simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    HasHost,
    Paired,
}

/// One sharing session on the relay: a host and at most one viewer.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: SharingCode,
    pub host: PeerId,
    pub viewer: Option<PeerId>,
    pub created_at: Instant,
}

impl Room {
    pub fn new(code: SharingCode, host: PeerId, created_at: Instant) -> Self {
        Self {
            code,
            host,
            viewer: None,
            created_at,
        }
    }

    pub fn state(&self) -> RoomState {
        match self.viewer {
            Some(_) => RoomState::Paired,
            None => RoomState::HasHost,
        }
    }

    /// True once the room is strictly older than `max_age` at `now`.
    pub fn is_expired(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > max_age
    }
}
