use screenbridge_client::RelaySink;
use screenbridge_core::ClientSignal;
use tokio::sync::mpsc;

/// RelaySink that hands outgoing signals to the test.
#[derive(Clone)]
pub struct MockRelaySink {
    tx: mpsc::UnboundedSender<ClientSignal>,
}

impl MockRelaySink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClientSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RelaySink for MockRelaySink {
    fn send(&self, signal: ClientSignal) -> bool {
        tracing::debug!("[MockRelay] outbound {:?}", signal);
        self.tx.send(signal).is_ok()
    }
}
