//! Protocol plug-ins for the fieldpoll operation engine.
//!
//! Each module supplies a property type with its wire encoding and the
//! operations built from it:
//! - [`manchester`]: preset recall/store over 3-byte receiver packets
//! - [`pelcod`]: pan/tilt/zoom and presets over 7-byte Pelco-D frames
//! - [`pelcop`]: the keyboard side of Pelco-P, answering macro selections
//!
//! Operations are returned ready to queue; call
//! [`Operation::begin`](fieldpoll_op::Operation::begin) (or submit them to a
//! [`LinkDriver`](fieldpoll_op::LinkDriver)) to start them.

pub mod manchester;
pub mod pelcod;
pub mod pelcop;
