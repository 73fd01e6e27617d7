use screenbridge_core::{PeerId, RelaySignal};
use screenbridge_server::SignalingOutput;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock SignalingOutput that captures all outgoing signals.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to send captured signals.
    tx: mpsc::UnboundedSender<(PeerId, RelaySignal)>,
    /// All captured signals (for verification).
    signals: Arc<Mutex<Vec<(PeerId, RelaySignal)>>>,
    /// Peers whose sends are refused, as if their socket had closed.
    offline: Arc<Mutex<HashSet<PeerId>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(PeerId, RelaySignal)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            signals: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(Mutex::new(HashSet::new())),
        };
        (signaling, rx)
    }

    /// Refuse every later send to `peer_id`.
    pub fn mark_offline(&self, peer_id: PeerId) {
        self.offline.lock().unwrap().insert(peer_id);
    }

    /// All signals captured for one peer, oldest first.
    pub fn signals_for(&self, peer_id: &PeerId) -> Vec<RelaySignal> {
        self.signals
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == peer_id)
            .map(|(_, signal)| signal.clone())
            .collect()
    }

    /// How many captured signals for `peer_id` match `pred`.
    pub fn count_for(&self, peer_id: &PeerId, pred: impl Fn(&RelaySignal) -> bool) -> usize {
        self.signals_for(peer_id).iter().filter(|s| pred(s)).count()
    }

    pub fn clear(&self) {
        self.signals.lock().unwrap().clear();
    }
}

impl SignalingOutput for MockSignalingOutput {
    fn send_signal(&self, peer_id: &PeerId, msg: RelaySignal) -> bool {
        tracing::debug!("[MockSignaling] send_signal to {}: {:?}", peer_id, msg);

        if self.offline.lock().unwrap().contains(peer_id) {
            return false;
        }

        self.signals.lock().unwrap().push((*peer_id, msg.clone()));
        let _ = self.tx.send((*peer_id, msg));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_signaling_captures_per_peer() {
        let (signaling, mut rx) = MockSignalingOutput::new();
        let peer_id = PeerId::new();

        assert!(signaling.send_signal(&peer_id, RelaySignal::HostDisconnected));
        assert!(signaling.send_signal(&PeerId::new(), RelaySignal::ViewerDisconnected));

        assert_eq!(
            signaling.signals_for(&peer_id),
            vec![RelaySignal::HostDisconnected]
        );
        assert_eq!(rx.try_recv().unwrap().0, peer_id);
    }

    #[test]
    fn test_mock_signaling_refuses_offline_peer() {
        let (signaling, _rx) = MockSignalingOutput::new();
        let peer_id = PeerId::new();
        signaling.mark_offline(peer_id);

        assert!(!signaling.send_signal(&peer_id, RelaySignal::HostDisconnected));
        assert!(signaling.signals_for(&peer_id).is_empty());
    }
}
