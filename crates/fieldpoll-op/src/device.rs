use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fieldpoll_message::CommEvent;

/// The persistent record of a field device, as seen by its operations.
///
/// The device outlives every operation run against it. Implementations
/// persist events and status text however they like (database, event log);
/// all methods take `&self` and may be called from any polling thread.
pub trait DeviceRecord: Send + Sync {
    /// Display name, used as the default operation id.
    fn name(&self) -> &str;

    /// Drop address used to reach the device on its link.
    fn drop_address(&self) -> u16;

    /// Record a communication event for `op_id`.
    fn log_event(&self, event: CommEvent, op_id: &str, text: &str);

    /// Set the maintenance status text.
    fn set_maint_text(&self, text: &str);

    /// Set the error status text.
    fn set_error_text(&self, text: &str);

    /// Notify the device that operation `op_id` has finished.
    fn complete_operation(&self, op_id: &str, success: bool);

    /// True if the device is already known to be down.
    fn is_failed(&self) -> bool;
}

/// A communication event captured by [`MemoryDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub event: CommEvent,
    pub op_id: String,
    pub text: String,
}

/// An in-memory [`DeviceRecord`] that keeps everything it is told.
#[derive(Debug)]
pub struct MemoryDevice {
    name: String,
    drop: u16,
    failed: AtomicBool,
    events: Mutex<Vec<LoggedEvent>>,
    maint_text: Mutex<Option<String>>,
    error_text: Mutex<Option<String>>,
    completions: Mutex<Vec<(String, bool)>>,
}

impl MemoryDevice {
    pub fn new(name: impl Into<String>, drop: u16) -> Self {
        Self {
            name: name.into(),
            drop,
            failed: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
            maint_text: Mutex::new(None),
            error_text: Mutex::new(None),
            completions: Mutex::new(Vec::new()),
        }
    }

    /// Mark the device failed (or restored) at the system level.
    pub fn set_failed(&self, failed: bool) {
        self.failed.store(failed, Ordering::Relaxed);
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        lock(&self.events).clone()
    }

    pub fn maint_text(&self) -> Option<String> {
        lock(&self.maint_text).clone()
    }

    pub fn error_text(&self) -> Option<String> {
        lock(&self.error_text).clone()
    }

    /// `(op_id, success)` for every completion notification received.
    pub fn completions(&self) -> Vec<(String, bool)> {
        lock(&self.completions).clone()
    }
}

impl DeviceRecord for MemoryDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn drop_address(&self) -> u16 {
        self.drop
    }

    fn log_event(&self, event: CommEvent, op_id: &str, text: &str) {
        lock(&self.events).push(LoggedEvent {
            event,
            op_id: op_id.to_string(),
            text: text.to_string(),
        });
    }

    fn set_maint_text(&self, text: &str) {
        *lock(&self.maint_text) = Some(text.to_string());
    }

    fn set_error_text(&self, text: &str) {
        *lock(&self.error_text) = Some(text.to_string());
    }

    fn complete_operation(&self, op_id: &str, success: bool) {
        lock(&self.completions).push((op_id.to_string(), success));
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_everything_it_is_told() {
        let dev = MemoryDevice::new("CAM_001", 4);
        assert_eq!(dev.name(), "CAM_001");
        assert_eq!(dev.drop_address(), 4);
        assert!(!dev.is_failed());

        dev.log_event(CommEvent::PollTimeout, "CAM_001", "poll timeout");
        dev.set_maint_text("lamp out");
        dev.set_error_text("bad checksum");
        dev.complete_operation("CAM_001", false);
        dev.set_failed(true);

        assert_eq!(dev.events().len(), 1);
        assert_eq!(dev.events()[0].event, CommEvent::PollTimeout);
        assert_eq!(dev.maint_text().as_deref(), Some("lamp out"));
        assert_eq!(dev.error_text().as_deref(), Some("bad checksum"));
        assert_eq!(dev.completions(), vec![("CAM_001".to_string(), false)]);
        assert!(dev.is_failed());
    }
}
