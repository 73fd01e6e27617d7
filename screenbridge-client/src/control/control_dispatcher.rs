use crate::control::InputSink;
use screenbridge_core::ControlMessage;
use std::sync::Arc;
use tracing::warn;

/// Host-side unpacking of control messages into the input sink.
#[derive(Clone)]
pub struct ControlDispatcher {
    sink: Arc<dyn InputSink>,
}

impl ControlDispatcher {
    pub fn new(sink: Arc<dyn InputSink>) -> Self {
        Self { sink }
    }

    /// Enacts every event carried by `text` in array order and returns how
    /// many there were. Unparseable messages are dropped.
    pub fn dispatch_text(&self, text: &str) -> usize {
        let message = match ControlMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed control message: {}", e);
                return 0;
            }
        };

        let events = message.into_events();
        for event in &events {
            self.sink.enact(event);
        }
        events.len()
    }
}
