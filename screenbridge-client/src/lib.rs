pub mod config;
pub mod control;
pub mod error;
pub mod link;
pub mod relay;
pub mod sdp;
pub mod session;

pub use config::*;
pub use control::*;
pub use error::*;
pub use link::*;
pub use relay::*;
pub use session::*;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A participant wired to a relay over WebSocket and to webrtc-rs links.
pub struct Participant {
    pub handle: SessionHandle,
    pub status: mpsc::UnboundedReceiver<SessionStatus>,
    relay_task: JoinHandle<()>,
    negotiator_task: JoinHandle<()>,
}

impl Participant {
    /// Connects to the relay at `relay` and starts negotiating. Hosts pass
    /// the media they share; viewers pass [`NoMedia`].
    pub fn start(
        relay: RelayClientConfig,
        media: Arc<dyn MediaSource>,
        config: NegotiatorConfig,
    ) -> Self {
        Self::start_with(relay, media, config, |negotiator| negotiator)
    }

    /// Like [`Participant::start`], letting the caller install input and
    /// cursor hooks before the negotiator runs.
    pub fn start_with(
        relay: RelayClientConfig,
        media: Arc<dyn MediaSource>,
        config: NegotiatorConfig,
        customize: impl FnOnce(SessionNegotiator) -> SessionNegotiator,
    ) -> Self {
        let (relay_handle, relay_events, relay_task) = RelayClient::spawn(relay);
        let (negotiator, handle, status) = SessionNegotiator::new(
            Arc::new(WebRtcLinkFactory::new(media)),
            Arc::new(relay_handle),
            relay_events,
            config,
        );
        let negotiator_task = tokio::spawn(customize(negotiator).run());

        Self {
            handle,
            status,
            relay_task,
            negotiator_task,
        }
    }

    /// Stops the negotiator, which in turn drops the relay connection.
    pub async fn shutdown(self) {
        let Self {
            handle,
            status,
            relay_task,
            negotiator_task,
        } = self;
        handle.disconnect();
        drop(handle);
        drop(status);

        let _ = negotiator_task.await;
        let _ = relay_task.await;
    }
}
