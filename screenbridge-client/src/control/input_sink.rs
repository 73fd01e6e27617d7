use screenbridge_core::ControlEvent;
use tracing::debug;

/// Enacts received control events on the host.
pub trait InputSink: Send + Sync {
    fn enact(&self, event: &ControlEvent);
}

/// Records events through `tracing` without touching any input device.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInputSink;

impl InputSink for LoggingInputSink {
    fn enact(&self, event: &ControlEvent) {
        debug!(?event, "Control event");
    }
}
