//! Relay configuration

use screenbridge_core::IceServerConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Shortest sweep period the relay will run with.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Relay configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,

    /// How often the expiry sweep runs
    pub sweep_interval: Duration,

    /// Rooms older than this are destroyed by the sweep
    pub room_max_age: Duration,

    /// STUN/TURN servers handed to every participant on connect
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            sweep_interval: Duration::from_secs(5 * 60),
            room_max_age: Duration::from_secs(60 * 60),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `SCREENBRIDGE_*` and `TURN_*` environment
    /// variables. Unparseable or zero values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(addr) = parse_var::<SocketAddr>("SCREENBRIDGE_BIND") {
            config.bind_addr = addr;
        }
        if let Some(interval) = parse_secs("SCREENBRIDGE_SWEEP_SECS") {
            config.sweep_interval = interval;
        }
        if let Some(max_age) = parse_secs("SCREENBRIDGE_ROOM_TTL_SECS") {
            config.room_max_age = max_age;
        }
        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        config
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the sweep period, no shorter than [`MIN_SWEEP_INTERVAL`]
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(MIN_SWEEP_INTERVAL);
        self
    }

    /// Set the maximum room age
    pub fn room_max_age(mut self, max_age: Duration) -> Self {
        self.room_max_age = max_age;
        self
    }

    /// Replace the ICE server list
    pub fn ice_servers(mut self, servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = servers;
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    parse_value(name, &env::var(name).ok()?)
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

fn parse_secs(name: &str) -> Option<Duration> {
    positive_secs(name, &env::var(name).ok()?)
}

fn positive_secs(name: &str, raw: &str) -> Option<Duration> {
    match parse_value::<u64>(name, raw)? {
        0 => {
            warn!("Ignoring {}=0, expected a positive number of seconds", name);
            None
        }
        secs => Some(Duration::from_secs(secs)),
    }
}
