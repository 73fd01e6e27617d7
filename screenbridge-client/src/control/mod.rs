mod control_dispatcher;
mod control_transport;
mod cursor_overlay;
mod input_sink;
mod move_throttle;

pub use control_dispatcher::*;
pub use control_transport::*;
pub use cursor_overlay::*;
pub use input_sink::*;
pub use move_throttle::*;
