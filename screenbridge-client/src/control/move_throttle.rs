use std::time::Duration;
use tokio::time::Instant;

/// Admits at most one pointer-move sample per `interval`.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl MoveThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
