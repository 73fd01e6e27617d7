use crate::control::{ControlDispatcher, ControlTransport};
use crate::error::SessionError;
use crate::link::{PeerLink, SdpKind, SessionId};
use crate::sdp::bias_for_latency;
use screenbridge_core::{PeerId, Role};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Negotiating,
    Connected,
    Closed,
}

/// The single negotiated link of a participant with its counterpart.
///
/// Closed is terminal; a retry builds a new Session.
pub struct Session {
    pub id: SessionId,
    pub role: Role,
    pub counterpart: PeerId,
    state: SessionState,
    link: Box<dyn PeerLink>,
    remote_set: bool,
    pending_candidates: Vec<String>,
    control: Option<ControlTransport>,
    dispatcher: Option<ControlDispatcher>,
}

impl Session {
    pub fn new(id: SessionId, role: Role, counterpart: PeerId, link: Box<dyn PeerLink>) -> Self {
        Self {
            id,
            role,
            counterpart,
            state: SessionState::Idle,
            link,
            remote_set: false,
            pending_candidates: Vec::new(),
            control: None,
            dispatcher: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn link(&self) -> &dyn PeerLink {
        self.link.as_ref()
    }

    pub fn mark_negotiating(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Negotiating;
        }
    }

    /// Returns `true` on the first transition into `Connected`.
    pub fn mark_connected(&mut self) -> bool {
        if self.state == SessionState::Negotiating {
            self.state = SessionState::Connected;
            return true;
        }
        false
    }

    /// Transforms `raw` and applies it as the local description. If the link
    /// rejects the transformed text the untransformed one is applied instead.
    /// Returns the description that was applied.
    pub async fn apply_local(&mut self, kind: SdpKind, raw: String) -> Result<String, SessionError> {
        let biased = match bias_for_latency(&raw) {
            Ok(biased) => biased,
            Err(e) => {
                warn!("{}: SDP transform failed ({}), using original", self.id, e);
                raw.clone()
            }
        };

        if biased != raw {
            match self.link.set_local_description(kind, biased.clone()).await {
                Ok(()) => return Ok(biased),
                Err(e) => warn!(
                    "{}: transformed {:?} rejected ({:#}), using original",
                    self.id, kind, e
                ),
            }
        }

        self.link
            .set_local_description(kind, raw.clone())
            .await
            .map_err(SessionError::negotiation)?;
        Ok(raw)
    }

    /// Applies the counterpart's description and replays candidates that
    /// arrived before it.
    pub async fn apply_remote(&mut self, kind: SdpKind, sdp: String) -> Result<(), SessionError> {
        self.link
            .set_remote_description(kind, sdp)
            .await
            .map_err(SessionError::negotiation)?;
        self.remote_set = true;

        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!("{}: replaying {} buffered candidates", self.id, pending.len());
        }
        for candidate in pending {
            self.add_candidate(candidate).await?;
        }
        Ok(())
    }

    /// Applies a remote candidate, or holds it until the remote description
    /// is set.
    pub async fn add_candidate(&mut self, candidate: String) -> Result<(), SessionError> {
        if !self.remote_set {
            self.pending_candidates.push(candidate);
            return Ok(());
        }
        self.link
            .add_ice_candidate(candidate)
            .await
            .map_err(SessionError::negotiation)
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn set_control(&mut self, transport: ControlTransport) {
        if let Some(mut previous) = self.control.replace(transport) {
            previous.disable();
        }
    }

    pub fn control(&mut self) -> Option<&mut ControlTransport> {
        self.control.as_mut()
    }

    pub fn set_dispatcher(&mut self, dispatcher: ControlDispatcher) {
        self.dispatcher = Some(dispatcher);
    }

    pub fn dispatcher(&self) -> Option<&ControlDispatcher> {
        self.dispatcher.as_ref()
    }

    /// Releases the control transport and the link. Safe to call twice.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(mut control) = self.control.take() {
            control.disable();
        }
        self.dispatcher = None;
        self.pending_candidates.clear();

        if let Err(e) = self.link.close().await {
            warn!("{}: failed to close link: {:#}", self.id, e);
        }
        info!("{} with {} closed", self.id, self.counterpart);
    }
}
