mod code;
mod control;
mod peer;
mod role;
mod signaling;

pub use code::{CODE_RANGE, CodeError, SharingCode, is_valid_code, normalize_code};
pub use control::{ControlEvent, ControlMessage, Delivery, Modifiers, StampedEvent, now_millis};
pub use peer::PeerId;
pub use role::Role;
pub use signaling::{ClientSignal, IceServerConfig, RelaySignal};
