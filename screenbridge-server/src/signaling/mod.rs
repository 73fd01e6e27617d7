mod connections;
mod signaling_output;
mod signaling_relay;
mod ws_handler;

pub use connections::*;
pub use signaling_output::*;
pub use signaling_relay::*;
pub use ws_handler::*;
