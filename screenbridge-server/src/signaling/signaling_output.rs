use screenbridge_core::{PeerId, RelaySignal};

/// Delivery of relay messages to live connections, implemented by the
/// WebSocket layer so the relay logic stays transport agnostic.
pub trait SignalingOutput: Send + Sync {
    /// Queues `msg` for `peer_id` without waiting for it to be written.
    /// Returns `false` if no such connection exists.
    fn send_signal(&self, peer_id: &PeerId, msg: RelaySignal) -> bool;
}
