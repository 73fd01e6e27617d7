use crate::model::code::SharingCode;
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Messages a participant sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientSignal {
    /// Ask for a fresh sharing code and become its host.
    RequestCode,
    /// Submit a code typed by the user and become its viewer.
    Join { code: String },
    Offer { target: PeerId, sdp: String },
    Answer { target: PeerId, sdp: String },
    Candidate { target: PeerId, candidate: String },
    /// Leave the current room without closing the socket.
    Leave,
}

/// Messages the relay sends to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum RelaySignal {
    Welcome {
        peer_id: PeerId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    CodeReply {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<SharingCode>,
    },
    JoinReply {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    ViewerArrived {
        viewer_id: PeerId,
    },
    Offer {
        sender: PeerId,
        sdp: String,
    },
    Answer {
        sender: PeerId,
        sdp: String,
    },
    Candidate {
        sender: PeerId,
        candidate: String,
    },
    HostDisconnected,
    ViewerDisconnected,
    RoomExpired {
        code: SharingCode,
    },
    Error {
        message: String,
    },
}

impl RelaySignal {
    pub fn join_accepted(host_id: PeerId) -> Self {
        Self::JoinReply {
            success: true,
            host_id: Some(host_id),
            message: None,
        }
    }

    pub fn join_rejected(message: impl Into<String>) -> Self {
        Self::JoinReply {
            success: false,
            host_id: None,
            message: Some(message.into()),
        }
    }
}
