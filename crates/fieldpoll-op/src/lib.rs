//! Phase-sequenced operation engine for polling field devices.
//!
//! An [`Operation`] is one logical task against one device, carried out as
//! a chain of [`Phase`]s. Each poll runs the current phase over a fresh
//! [`CommMessage`](fieldpoll_message::CommMessage); the phase's result picks
//! the next phase or ends the operation. Communication errors are retried
//! up to a configurable threshold, and the outcome is reported back to the
//! [`DeviceRecord`] exactly once at cleanup.
//!
//! [`OpQueue`] and [`LinkDriver`] are a reference scheduler for a single
//! link; larger pollers can drive operations directly.

pub mod config;
pub mod device;
pub mod driver;
pub mod operation;
pub mod phase;
pub mod priority;
pub mod queue;
pub mod status;

pub use config::{EngineConfig, SystemConfig, DEFAULT_RETRY_THRESHOLD};
pub use device::{DeviceRecord, LoggedEvent, MemoryDevice};
pub use driver::{LinkDriver, PollOutcome, RunSummary};
pub use operation::{OpState, Operation};
pub use phase::{phase_fn, Next, Phase};
pub use priority::PriorityLevel;
pub use queue::OpQueue;
pub use status::{filter_msg, MAX_STATUS_LEN};

pub use fieldpoll_message::{PollError, Result};
