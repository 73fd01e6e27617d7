use crate::link::{LinkEvent, SessionId};
use anyhow::Result;
use async_trait::async_trait;
use screenbridge_core::{IceServerConfig, Role};
use tokio::sync::mpsc;

/// Which half of an offer/answer exchange a description is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Best-effort text channel carrying control events.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    fn is_open(&self) -> bool;

    async fn send_text(&self, text: String) -> Result<()>;
}

/// One point-to-point connectivity object. Descriptors and candidates are
/// opaque strings; state changes and control traffic come back as
/// [`LinkEvent`]s on the channel the link was created with.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Adds the local media tracks to the connection.
    async fn attach_local_media(&self) -> Result<()>;

    /// Creates the unordered, non-retransmitting control channel.
    async fn open_control_channel(&self) -> Result<()>;

    async fn create_offer(&self) -> Result<String>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_local_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: String) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerLinkFactory: Send + Sync {
    async fn create(
        &self,
        session_id: SessionId,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>>;
}
