use screenbridge_core::IceServerConfig;
use std::time::Duration;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Shortest flush period the control transport will run with.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Pacing of the viewer's outbound control events.
#[derive(Debug, Clone, Copy)]
pub struct ControlConfig {
    /// Period of the batch flush.
    pub flush_interval: Duration,
    /// Most events drained into one batch.
    pub max_batch: usize,
    /// Minimum spacing between accepted pointer-move samples.
    pub move_interval: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_millis(16),
            max_batch: 50,
            move_interval: Duration::from_millis(8),
        }
    }
}

/// Connectivity settings used until the relay supplies its own ICE list.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// WebSocket URL of the relay, e.g. `ws://localhost:3000/ws`.
    pub url: String,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RelayClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }

    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }
}

/// Everything the session negotiator needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct NegotiatorConfig {
    pub link: LinkConfig,
    pub control: ControlConfig,
}
