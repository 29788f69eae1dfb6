//! Shared APU sub-units used by multiple channels

pub mod divider;
pub mod envelope;
pub mod frame_counter;
pub mod length_counter;
pub mod linear_counter;
pub mod sweep;

pub use divider::Divider;
pub use envelope::Envelope;
pub use frame_counter::{FrameCounter, FrameSignal};
pub use length_counter::LengthCounter;
pub use linear_counter::LinearCounter;
pub use sweep::Sweep;
