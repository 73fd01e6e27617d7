use screenbridge_core::{ClientSignal, RelaySignal};

/// What the relay connection reports to the negotiator.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// A (re)connection succeeded. Connection ids from before are void.
    Connected,
    Signal(RelaySignal),
    /// The connection dropped; a reconnect is scheduled.
    Disconnected,
}

/// Outbound half of the relay connection.
pub trait RelaySink: Send + Sync {
    /// Queues `signal` for the current connection. Returns `false` once the
    /// relay client has shut down.
    fn send(&self, signal: ClientSignal) -> bool;
}
