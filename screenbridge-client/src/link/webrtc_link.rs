use crate::link::{
    ControlChannel, LinkEvent, LinkState, MediaSource, NoMedia, PeerLink, PeerLinkFactory,
    SdpKind, SessionId,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use screenbridge_core::{IceServerConfig, Role};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

pub const CONTROL_CHANNEL_LABEL: &str = "control";

impl From<RTCPeerConnectionState> for LinkState {
    fn from(state: RTCPeerConnectionState) -> Self {
        match state {
            RTCPeerConnectionState::Connecting => LinkState::Connecting,
            RTCPeerConnectionState::Connected => LinkState::Connected,
            RTCPeerConnectionState::Disconnected => LinkState::Disconnected,
            RTCPeerConnectionState::Failed => LinkState::Failed,
            RTCPeerConnectionState::Closed => LinkState::Closed,
            _ => LinkState::New,
        }
    }
}

pub fn to_rtc_ice_servers(servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    servers
        .iter()
        .map(|server| RTCIceServer {
            urls: server.urls.clone(),
            username: server.username.clone().unwrap_or_default(),
            credential: server.credential.clone().unwrap_or_default(),
            ..Default::default()
        })
        .collect()
}

/// Creates webrtc-rs backed links. Hosts attach the tracks of `media`.
#[derive(Clone)]
pub struct WebRtcLinkFactory {
    media: Arc<dyn MediaSource>,
}

impl WebRtcLinkFactory {
    pub fn new(media: Arc<dyn MediaSource>) -> Self {
        Self { media }
    }
}

impl Default for WebRtcLinkFactory {
    fn default() -> Self {
        Self::new(Arc::new(NoMedia))
    }
}

#[async_trait]
impl PeerLinkFactory for WebRtcLinkFactory {
    async fn create(
        &self,
        session_id: SessionId,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>> {
        let media: Arc<dyn MediaSource> = match role {
            Role::Host => self.media.clone(),
            Role::Viewer => Arc::new(NoMedia),
        };
        let link = WebRtcLink::new(session_id, ice_servers, media, events).await?;
        Ok(Box::new(link))
    }
}

pub struct WebRtcLink {
    pub session_id: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
    media: Arc<dyn MediaSource>,
    events: mpsc::Sender<LinkEvent>,
}

impl WebRtcLink {
    pub async fn new(
        session_id: SessionId,
        ice_servers: &[IceServerConfig],
        media: Arc<dyn MediaSource>,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: to_rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", session_id, s);
                    let _ = tx
                        .send(LinkEvent::StateChanged(session_id, s.into()))
                        .await;
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx
                    .send(LinkEvent::CandidateGenerated(session_id, str_candidate))
                    .await;
            })
        }));

        let dc_tx = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();

            Box::pin(async move {
                debug!("Remote DataChannel '{}' for {}", dc.label(), session_id);
                wire_control_channel(session_id, dc, tx);
            })
        }));

        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            Box::pin(async move {
                info!("Remote {} track for {}", track.kind(), session_id);
            })
        }));

        Ok(Self {
            session_id,
            peer_connection,
            media,
            events,
        })
    }
}

/// Reports the channel once open and forwards its text messages.
fn wire_control_channel(
    session_id: SessionId,
    dc: Arc<RTCDataChannel>,
    events: mpsc::Sender<LinkEvent>,
) {
    let dc_on_open = dc.clone();
    let tx_open = events.clone();
    dc.on_open(Box::new(move || {
        let tx = tx_open.clone();
        let channel: Arc<dyn ControlChannel> = Arc::new(WebRtcControlChannel {
            dc: dc_on_open.clone(),
        });

        Box::pin(async move {
            info!("Control channel open for {}", session_id);
            let _ = tx
                .send(LinkEvent::ControlChannelReady(session_id, channel))
                .await;
        })
    }));

    let tx_msg = events;
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx_msg.clone();
        Box::pin(async move {
            let Ok(text) = String::from_utf8(msg.data.to_vec()) else {
                warn!("Dropping non UTF-8 control message on {}", session_id);
                return;
            };
            let _ = tx.send(LinkEvent::ControlMessage(session_id, text)).await;
        })
    }));
}

#[async_trait]
impl PeerLink for WebRtcLink {
    async fn attach_local_media(&self) -> Result<()> {
        for track in self.media.tracks() {
            let sender = self
                .peer_connection
                .add_track(track)
                .await
                .context("Failed to add local track")?;

            // Incoming RTCP must be drained for the interceptors to work.
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    async fn open_control_channel(&self) -> Result<()> {
        let init = RTCDataChannelInit {
            ordered: Some(false),
            max_retransmits: Some(0),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(CONTROL_CHANNEL_LABEL, Some(init))
            .await
            .context("Failed to create control channel")?;

        wire_control_channel(self.session_id, dc, self.events.clone());
        Ok(())
    }

    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(answer.sdp)
    }

    async fn set_local_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.peer_connection
            .set_local_description(description(kind, sdp)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        self.peer_connection
            .set_remote_description(description(kind, sdp)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate_json: String) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_str(&candidate_json).context("Failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn description(kind: SdpKind, sdp: String) -> Result<RTCSessionDescription> {
    let desc = match kind {
        SdpKind::Offer => RTCSessionDescription::offer(sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(sdp)?,
    };
    Ok(desc)
}

pub struct WebRtcControlChannel {
    dc: Arc<RTCDataChannel>,
}

#[async_trait]
impl ControlChannel for WebRtcControlChannel {
    fn is_open(&self) -> bool {
        self.dc.ready_state() == RTCDataChannelState::Open
    }

    async fn send_text(&self, text: String) -> Result<()> {
        self.dc
            .send_text(text)
            .await
            .context("Failed to send control message")?;
        Ok(())
    }
}
