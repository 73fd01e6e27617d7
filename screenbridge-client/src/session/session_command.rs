use screenbridge_core::ControlEvent;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    RequestCode,
    Join(String),
    Disconnect,
    EnableControl,
    DisableControl,
    Capture(ControlEvent),
}

/// User-facing entry point into a running negotiator.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { tx }
    }

    /// Become a host: ask the relay for a fresh code.
    pub fn request_code(&self) -> bool {
        self.send(SessionCommand::RequestCode)
    }

    /// Become a viewer of the room behind the typed `code`.
    pub fn join(&self, code: impl Into<String>) -> bool {
        self.send(SessionCommand::Join(code.into()))
    }

    pub fn disconnect(&self) -> bool {
        self.send(SessionCommand::Disconnect)
    }

    pub fn enable_control(&self) -> bool {
        self.send(SessionCommand::EnableControl)
    }

    pub fn disable_control(&self) -> bool {
        self.send(SessionCommand::DisableControl)
    }

    pub fn capture(&self, event: ControlEvent) -> bool {
        self.send(SessionCommand::Capture(event))
    }

    /// Returns `false` once the negotiator has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}
