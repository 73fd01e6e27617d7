mod link_event;
mod media;
mod peer_link;
mod webrtc_link;

pub use link_event::*;
pub use media::*;
pub use peer_link::*;
pub use webrtc_link::*;
