use crate::config::NegotiatorConfig;
use crate::control::{
    ControlDispatcher, ControlTransport, CursorOverlay, InputSink, LoggingInputSink,
    NoCursorOverlay,
};
use crate::error::SessionError;
use crate::link::{LinkEvent, LinkState, PeerLinkFactory, SdpKind, SessionId};
use crate::relay::{RelayEvent, RelaySink};
use crate::session::{Session, SessionCommand, SessionHandle, SessionState, SessionStatus};
use screenbridge_core::{
    ClientSignal, ControlEvent, IceServerConfig, PeerId, RelaySignal, Role, SharingCode,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Per-participant driver of the offer/answer/candidate exchange.
///
/// Runs as one task selecting over user commands, relay events and events
/// from the current link, so every input is handled in arrival order.
pub struct SessionNegotiator {
    factory: Arc<dyn PeerLinkFactory>,
    relay: Arc<dyn RelaySink>,
    relay_events: mpsc::Receiver<RelayEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    link_tx: mpsc::Sender<LinkEvent>,
    link_rx: mpsc::Receiver<LinkEvent>,
    status_tx: mpsc::UnboundedSender<SessionStatus>,
    config: NegotiatorConfig,
    input_sink: Arc<dyn InputSink>,
    cursor: Arc<dyn CursorOverlay>,

    ice_servers: Vec<IceServerConfig>,
    local_id: Option<PeerId>,
    role: Option<Role>,
    code: Option<SharingCode>,
    counterpart: Option<PeerId>,
    session: Option<Session>,
    next_session: u64,
    early_candidates: Vec<(PeerId, String)>,
}

impl SessionNegotiator {
    pub fn new(
        factory: Arc<dyn PeerLinkFactory>,
        relay: Arc<dyn RelaySink>,
        relay_events: mpsc::Receiver<RelayEvent>,
        config: NegotiatorConfig,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionStatus>) {
        let (cmd_tx, commands) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (link_tx, link_rx) = mpsc::channel(256);

        let negotiator = Self {
            factory,
            relay,
            relay_events,
            commands,
            link_tx,
            link_rx,
            status_tx,
            ice_servers: config.link.ice_servers.clone(),
            config,
            input_sink: Arc::new(LoggingInputSink),
            cursor: Arc::new(NoCursorOverlay),
            local_id: None,
            role: None,
            code: None,
            counterpart: None,
            session: None,
            next_session: 0,
            early_candidates: Vec::new(),
        };

        (negotiator, SessionHandle::new(cmd_tx), status_rx)
    }

    pub fn with_input_sink(mut self, sink: Arc<dyn InputSink>) -> Self {
        self.input_sink = sink;
        self
    }

    pub fn with_cursor_overlay(mut self, cursor: Arc<dyn CursorOverlay>) -> Self {
        self.cursor = cursor;
        self
    }

    pub async fn run(mut self) {
        info!("Session negotiator started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down negotiator.");
                            break;
                        }
                    }
                }

                evt = self.relay_events.recv() => {
                    match evt {
                        Some(e) => self.handle_relay_event(e).await,
                        None => {
                            warn!("Relay event channel closed unexpectedly");
                            break;
                        }
                    }
                }

                Some(evt) = self.link_rx.recv() => self.handle_link_event(evt).await,
            }
        }

        self.close_session("Negotiator stopped").await;
        info!("Session negotiator finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::RequestCode => {
                self.close_session("New room requested").await;
                self.reset_role();
                self.send_relay(ClientSignal::RequestCode);
            }

            SessionCommand::Join(raw) => {
                let code = match SharingCode::parse(&raw) {
                    Ok(code) => code,
                    Err(e) => {
                        info!("Rejected code locally: {}", e);
                        self.status(SessionStatus::Error(SessionError::InvalidCode));
                        return;
                    }
                };
                self.close_session("Joining another room").await;
                self.reset_role();
                self.send_relay(ClientSignal::Join {
                    code: code.to_string(),
                });
            }

            SessionCommand::Disconnect => {
                self.close_session("Disconnected by user").await;
                // A pending join may still bind us, so leave unconditionally.
                self.send_relay(ClientSignal::Leave);
                self.reset_role();
            }

            SessionCommand::EnableControl => {
                let Some(control) = self.connected_control() else {
                    warn!("Control requested without an open control channel");
                    self.status(SessionStatus::Error(SessionError::TransportUnavailable));
                    return;
                };
                if control.enable() {
                    self.status(SessionStatus::ControlEnabled);
                }
            }

            SessionCommand::DisableControl => {
                let disabled = self
                    .session
                    .as_mut()
                    .and_then(Session::control)
                    .is_some_and(ControlTransport::disable);
                if disabled {
                    self.status(SessionStatus::ControlDisabled);
                }
            }

            SessionCommand::Capture(event) => self.capture(event).await,
        }
    }

    async fn capture(&mut self, event: ControlEvent) {
        let Some(control) = self.session.as_mut().and_then(Session::control) else {
            return;
        };
        control.capture(event).await;
    }

    fn connected_control(&mut self) -> Option<&mut ControlTransport> {
        let session = self.session.as_mut()?;
        if session.role != Role::Viewer || session.state() != SessionState::Connected {
            return None;
        }
        session.control()
    }

    async fn handle_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Connected => {
                info!("Connected to relay");
                self.status(SessionStatus::RelayConnected);
            }
            RelayEvent::Disconnected => {
                warn!("Lost relay connection");
                self.close_session("Relay connection lost").await;
                self.reset_role();
                self.local_id = None;
            }
            RelayEvent::Signal(signal) => self.handle_signal(signal).await,
        }
    }

    async fn handle_signal(&mut self, signal: RelaySignal) {
        match signal {
            RelaySignal::Welcome { peer_id } => {
                info!("Relay assigned id {}", peer_id);
                self.local_id = Some(peer_id);
            }

            RelaySignal::IceConfig { ice_servers } => {
                info!("Received ICE config: {} servers", ice_servers.len());
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
            }

            RelaySignal::CodeReply { success, code } => match (success, code) {
                (true, Some(code)) => {
                    info!("Hosting room {}", code);
                    self.role = Some(Role::Host);
                    self.code = Some(code.clone());
                    self.status(SessionStatus::CodeAssigned(code));
                }
                _ => warn!("Relay refused to assign a code"),
            },

            RelaySignal::JoinReply {
                success,
                host_id,
                message,
            } => match (success, host_id) {
                (true, Some(host)) => {
                    info!("Joined room hosted by {}", host);
                    self.role = Some(Role::Viewer);
                    self.counterpart = Some(host);
                    self.status(SessionStatus::Joined { host });
                }
                _ => {
                    let err = SessionError::from_join_rejection(message.as_deref());
                    info!("Join rejected: {}", err);
                    self.reset_role();
                    self.status(SessionStatus::Error(err));
                }
            },

            RelaySignal::ViewerArrived { viewer_id } => {
                if self.role != Some(Role::Host) {
                    warn!("Viewer arrival while not hosting, ignoring");
                    return;
                }
                self.counterpart = Some(viewer_id);
                self.status(SessionStatus::ViewerArrived { viewer: viewer_id });
                self.start_host_session(viewer_id).await;
            }

            RelaySignal::Offer { sender, sdp } => {
                if self.role != Some(Role::Viewer) || self.counterpart != Some(sender) {
                    warn!("Ignoring offer from unexpected peer {}", sender);
                    return;
                }
                self.start_viewer_session(sender, sdp).await;
            }

            RelaySignal::Answer { sender, sdp } => {
                let Some(session) = self.session.as_mut() else {
                    warn!("Answer from {} without a session", sender);
                    return;
                };
                if session.role != Role::Host || session.counterpart != sender {
                    warn!("Ignoring answer from unexpected peer {}", sender);
                    return;
                }
                if let Err(e) = session.apply_remote(SdpKind::Answer, sdp).await {
                    self.fail_session(e).await;
                }
            }

            RelaySignal::Candidate { sender, candidate } => {
                self.handle_remote_candidate(sender, candidate).await;
            }

            RelaySignal::HostDisconnected => {
                if self.role != Some(Role::Viewer) {
                    return;
                }
                self.close_session("Host disconnected").await;
                self.reset_role();
            }

            RelaySignal::ViewerDisconnected => {
                if self.role != Some(Role::Host) {
                    return;
                }
                // The room persists: keep the code for the next viewer.
                self.close_session("Viewer disconnected").await;
                self.counterpart = None;
                self.early_candidates.clear();
            }

            RelaySignal::RoomExpired { code } => {
                info!("Room {} expired", code);
                self.code = None;
                if self.session.is_none() {
                    self.reset_role();
                }
                self.status(SessionStatus::RoomExpired(code));
            }

            RelaySignal::Error { message } => warn!("Relay error: {}", message),
        }
    }

    async fn handle_remote_candidate(&mut self, sender: PeerId, candidate: String) {
        let Some(session) = self.session.as_mut() else {
            if self.counterpart == Some(sender) {
                debug!("Holding early candidate from {}", sender);
                self.early_candidates.push((sender, candidate));
            } else {
                debug!("Dropping candidate from unrelated peer {}", sender);
            }
            return;
        };

        if session.counterpart != sender {
            debug!("Dropping candidate from unrelated peer {}", sender);
            return;
        }
        if let Err(e) = session.add_candidate(candidate).await {
            self.fail_session(e).await;
        }
    }

    async fn start_host_session(&mut self, viewer: PeerId) {
        self.close_session("Replaced by a new viewer").await;

        let Some(mut session) = self.create_session(Role::Host, viewer).await else {
            return;
        };
        session.set_dispatcher(ControlDispatcher::new(self.input_sink.clone()));
        session.mark_negotiating();

        let result = async {
            let link = session.link();
            link.attach_local_media()
                .await
                .map_err(SessionError::negotiation)?;
            link.open_control_channel()
                .await
                .map_err(SessionError::negotiation)?;
            let offer = link.create_offer().await.map_err(SessionError::negotiation)?;
            session.apply_local(SdpKind::Offer, offer).await
        }
        .await;

        self.session = Some(session);
        match result {
            Ok(sdp) => {
                self.send_relay(ClientSignal::Offer {
                    target: viewer,
                    sdp,
                });
                self.replay_early_candidates(viewer).await;
            }
            Err(e) => self.fail_session(e).await,
        }
    }

    async fn start_viewer_session(&mut self, host: PeerId, offer: String) {
        self.close_session("Renegotiating").await;

        let Some(mut session) = self.create_session(Role::Viewer, host).await else {
            return;
        };
        session.mark_negotiating();
        self.session = Some(session);
        self.replay_early_candidates(host).await;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = async {
            session.apply_remote(SdpKind::Offer, offer).await?;
            let answer = session
                .link()
                .create_answer()
                .await
                .map_err(SessionError::negotiation)?;
            session.apply_local(SdpKind::Answer, answer).await
        }
        .await;

        match result {
            Ok(sdp) => self.send_relay(ClientSignal::Answer { target: host, sdp }),
            Err(e) => self.fail_session(e).await,
        }
    }

    async fn create_session(&mut self, role: Role, counterpart: PeerId) -> Option<Session> {
        self.next_session += 1;
        let id = SessionId(self.next_session);

        match self
            .factory
            .create(id, role, &self.ice_servers, self.link_tx.clone())
            .await
        {
            Ok(link) => {
                info!("{} started as {} with {}", id, role, counterpart);
                Some(Session::new(id, role, counterpart, link))
            }
            Err(e) => {
                error!("Failed to create link for {}: {:#}", counterpart, e);
                self.status(SessionStatus::Error(SessionError::negotiation(e)));
                self.abandon_room();
                None
            }
        }
    }

    /// Feeds candidates that arrived before the Session existed.
    async fn replay_early_candidates(&mut self, counterpart: PeerId) {
        let early = std::mem::take(&mut self.early_candidates);
        for (sender, candidate) in early {
            if sender == counterpart {
                self.handle_remote_candidate(sender, candidate).await;
            }
        }
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        let Some(session) = self.session.as_mut() else {
            debug!("Link event without a session: {:?}", event);
            return;
        };
        if event.session_id() != session.id {
            debug!("Discarding stale link event {:?}", event);
            return;
        }

        match event {
            LinkEvent::CandidateGenerated(_, candidate) => {
                let target = session.counterpart;
                self.send_relay(ClientSignal::Candidate { target, candidate });
            }

            LinkEvent::StateChanged(_, state) => {
                if state == LinkState::Connected {
                    if session.mark_connected() {
                        self.status(SessionStatus::Connected);
                    }
                } else if state.is_terminal() {
                    warn!("{} link reached {:?}", session.id, state);
                    self.fail_session(SessionError::ConnectivityLost).await;
                }
            }

            LinkEvent::ControlChannelReady(_, channel) => {
                if session.role == Role::Viewer {
                    session.set_control(ControlTransport::new(
                        channel,
                        self.config.control,
                        self.cursor.clone(),
                    ));
                }
            }

            LinkEvent::ControlMessage(_, text) => match session.dispatcher() {
                Some(dispatcher) => {
                    dispatcher.dispatch_text(&text);
                }
                None => debug!("Ignoring control message on the viewer"),
            },
        }
    }

    /// Logs and surfaces `err`, then tears the Session down. The user must
    /// start over; nothing is retried in place.
    async fn fail_session(&mut self, err: SessionError) {
        error!("Session failed: {}", err);
        self.status(SessionStatus::Error(err.clone()));
        self.close_session(&err.to_string()).await;
        self.abandon_room();
    }

    /// Gives up the relay seat after a failure so the user can re-initiate
    /// from scratch.
    fn abandon_room(&mut self) {
        if self.role.is_some() {
            self.send_relay(ClientSignal::Leave);
        }
        self.reset_role();
    }

    async fn close_session(&mut self, reason: &str) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let had_control = session.control().is_some_and(|c| c.is_enabled());
        session.close().await;

        if had_control {
            self.status(SessionStatus::ControlDisabled);
        }
        self.status(SessionStatus::Closed {
            reason: reason.to_owned(),
        });
    }

    fn reset_role(&mut self) {
        self.role = None;
        self.code = None;
        self.counterpart = None;
        self.early_candidates.clear();
    }

    fn send_relay(&self, signal: ClientSignal) {
        if !self.relay.send(signal) {
            warn!("Relay client is gone, dropping signal");
        }
    }

    fn status(&self, status: SessionStatus) {
        let _ = self.status_tx.send(status);
    }
}
