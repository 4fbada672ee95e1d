//! Per-poll message transactions for field device links.
//!
//! This is the lowest layer of fieldpoll. A protocol describes each command
//! or response as a [`Property`] that knows its own wire encoding. A phase
//! of an operation collects properties into a [`CommMessage`], which runs the
//! actual round trip over an [`Exchange`]:
//! - `store` writes each property and reads back its acknowledgement
//! - `query` requests each property and decodes the response into it
//!
//! The link behind [`Exchange`] is opaque: TCP, UDP and serial multiplexers
//! all look the same from here.

pub mod error;
pub mod exchange;
pub mod loopback;
pub mod message;
pub mod property;

pub use error::{CommError, CommEvent, ContentionError, PollError, Result};
pub use exchange::{Exchange, Expect};
pub use loopback::ScriptedLink;
pub use message::CommMessage;
pub use property::{require, Property};
