use thiserror::Error;

/// Failures a participant can see. None of them is fatal: each ends in a
/// user-initiated retry or a clean teardown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid sharing code")]
    InvalidCode,

    #[error("Room is full")]
    RoomFull,

    #[error("Negotiation failed: {0}")]
    NegotiationFailed(String),

    #[error("Connection lost")]
    ConnectivityLost,

    #[error("Control channel is not open")]
    TransportUnavailable,
}

impl SessionError {
    /// Maps the relay's rejection text for a join back to a typed error.
    pub fn from_join_rejection(message: Option<&str>) -> Self {
        match message {
            Some("Room is full") => SessionError::RoomFull,
            _ => SessionError::InvalidCode,
        }
    }

    pub fn negotiation(err: impl std::fmt::Display) -> Self {
        SessionError::NegotiationFailed(err.to_string())
    }
}
