mod peer_index;
mod room;
mod room_error;
mod room_registry;
mod room_store;
mod sweeper;

pub use peer_index::*;
pub use room::*;
pub use room_error::*;
pub use room_registry::*;
pub use room_store::*;
pub use sweeper::*;
