use thiserror::Error;

/// Reasons a join can be refused. The `Display` text is sent to the viewer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("Invalid sharing code")]
    NotFound,

    #[error("Room is full")]
    RoomFull,
}
