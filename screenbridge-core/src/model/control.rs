use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

/// One input action captured on the viewer.
///
/// Pointer coordinates are normalized to `[0, 1]` relative to the displayed
/// video surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlEvent {
    Move {
        x: f64,
        y: f64,
    },
    ButtonDown {
        button: u8,
        x: f64,
        y: f64,
    },
    ButtonUp {
        button: u8,
        x: f64,
        y: f64,
    },
    Wheel {
        delta_x: f64,
        delta_y: f64,
        delta_mode: u32,
    },
    KeyDown {
        key: String,
        code: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
        code: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// How an event travels over the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued and sent in the next batch.
    Coalesced,
    /// Sent on its own right away.
    Immediate,
}

impl ControlEvent {
    pub fn delivery(&self) -> Delivery {
        match self {
            ControlEvent::Move { .. } | ControlEvent::Wheel { .. } => Delivery::Coalesced,
            _ => Delivery::Immediate,
        }
    }

    pub fn is_pointer_move(&self) -> bool {
        matches!(self, ControlEvent::Move { .. })
    }

    /// Maps a pixel position on a surface of `width` x `height` into the
    /// normalized range, clamping positions outside the surface.
    pub fn normalize_position(px: f64, py: f64, width: f64, height: f64) -> (f64, f64) {
        let axis = |v: f64, extent: f64| {
            if extent <= 0.0 || !v.is_finite() {
                0.0
            } else {
                (v / extent).clamp(0.0, 1.0)
            }
        };
        (axis(px, width), axis(py, height))
    }

    pub fn pointer(px: f64, py: f64, width: f64, height: f64) -> Self {
        let (x, y) = Self::normalize_position(px, py, width, height);
        ControlEvent::Move { x, y }
    }
}

/// A single event stamped when it was handed to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedEvent {
    #[serde(flatten)]
    pub event: ControlEvent,
    pub timestamp: u64,
}

/// Everything that crosses the control channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlMessage {
    Batch {
        events: Vec<ControlEvent>,
        timestamp: u64,
    },
    Single(StampedEvent),
}

impl ControlMessage {
    pub fn batch(events: Vec<ControlEvent>) -> Self {
        ControlMessage::Batch {
            events,
            timestamp: now_millis(),
        }
    }

    pub fn single(event: ControlEvent) -> Self {
        ControlMessage::Single(StampedEvent {
            event,
            timestamp: now_millis(),
        })
    }

    /// Events in the order they must be enacted.
    pub fn into_events(self) -> Vec<ControlEvent> {
        match self {
            ControlMessage::Batch { events, .. } => events,
            ControlMessage::Single(stamped) => vec![stamped.event],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Milliseconds since the UNIX epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
