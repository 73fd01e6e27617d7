use crate::error::SessionError;
use screenbridge_core::{PeerId, SharingCode};

/// Progress reports for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    RelayConnected,
    CodeAssigned(SharingCode),
    Joined { host: PeerId },
    ViewerArrived { viewer: PeerId },
    Connected,
    ControlEnabled,
    ControlDisabled,
    RoomExpired(SharingCode),
    Closed { reason: String },
    Error(SessionError),
}
