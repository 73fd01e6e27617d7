mod relay_client;
mod relay_event;

pub use relay_client::*;
pub use relay_event::*;
