pub use screenbridge_core::{PeerId, Role, SharingCode};

pub mod model {
    pub use screenbridge_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use screenbridge_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use screenbridge_client::*;
}
