use crate::link::ControlChannel;
use std::fmt;
use std::sync::Arc;

/// Identifies one Session of a participant. Ids only grow, so events from a
/// replaced Session can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Connection state as reported by the connectivity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl LinkState {
    /// States after which the link never carries traffic again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LinkState::Disconnected | LinkState::Failed | LinkState::Closed
        )
    }
}

/// Events the connectivity layer raises for the negotiator loop.
pub enum LinkEvent {
    /// A local candidate was discovered and must be relayed to the counterpart.
    CandidateGenerated(SessionId, String),

    /// The underlying connection changed state.
    StateChanged(SessionId, LinkState),

    /// The control channel opened and is ready for writes.
    ControlChannelReady(SessionId, Arc<dyn ControlChannel>),

    /// A text message arrived on the control channel.
    ControlMessage(SessionId, String),
}

impl LinkEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            LinkEvent::CandidateGenerated(id, _)
            | LinkEvent::StateChanged(id, _)
            | LinkEvent::ControlChannelReady(id, _)
            | LinkEvent::ControlMessage(id, _) => *id,
        }
    }
}

impl fmt::Debug for LinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkEvent::CandidateGenerated(id, _) => write!(f, "CandidateGenerated({id})"),
            LinkEvent::StateChanged(id, state) => write!(f, "StateChanged({id}, {state:?})"),
            LinkEvent::ControlChannelReady(id, _) => write!(f, "ControlChannelReady({id})"),
            LinkEvent::ControlMessage(id, text) => {
                write!(f, "ControlMessage({id}, {} bytes)", text.len())
            }
        }
    }
}
