//! Manchester camera protocol.
//!
//! Every packet is three bytes addressed to a receiver number (1..=1024).
//! The first two bytes carry the receiver, the third the command. Receivers
//! never answer, so everything here is write-only.

mod op_preset;
mod property;

pub use op_preset::op_preset;
pub use property::{ManchesterProperty, PresetProperty, MAX_ADDRESS, MAX_PRESET};
