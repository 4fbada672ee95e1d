//! Phase-sequenced polling of field devices over shared links.
//!
//! fieldpoll runs long-lived operations (recall a camera preset, start a
//! pan, answer a keyboard) as chains of request/response phases, retrying
//! communication errors up to a configured threshold and reporting the
//! outcome back to the device record.
//!
//! # Crate Structure
//!
//! - [`message`]: properties, per-poll message transactions, the link seam
//! - [`op`]: the operation engine, priorities, queue and single-link driver
//! - [`proto`]: Manchester, Pelco-D and Pelco-P plug-ins (behind `proto` feature)

/// Re-export message types.
pub mod message {
    pub use fieldpoll_message::*;
}

/// Re-export engine types.
pub mod op {
    pub use fieldpoll_op::*;
}

/// Re-export protocol plug-ins (requires `proto` feature).
#[cfg(feature = "proto")]
pub mod proto {
    pub use fieldpoll_proto::*;
}
