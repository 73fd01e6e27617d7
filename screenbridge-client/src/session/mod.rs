mod negotiator;
mod session;
mod session_command;
mod session_status;

pub use negotiator::*;
pub use session::*;
pub use session_command::*;
pub use session_status::*;
