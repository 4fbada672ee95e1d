use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fieldpoll_message::{CommEvent, CommMessage, PollError, Property, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SystemConfig;
use crate::device::DeviceRecord;
use crate::phase::{Next, Phase};
use crate::priority::PriorityLevel;
use crate::status::{append_status, filter_msg};

/// Observable lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpState {
    /// Built but not begun.
    Pending,
    /// A phase is installed or running.
    InProgress,
    Succeeded,
    Failed,
}

impl OpState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OpState::Succeeded | OpState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpState::Pending => "pending",
            OpState::InProgress => "in_progress",
            OpState::Succeeded => "succeeded",
            OpState::Failed => "failed",
        }
    }
}

impl fmt::Display for OpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type PhaseOne<P> = Box<dyn FnOnce() -> Box<dyn Phase<P>> + Send>;

enum Slot<P: Property> {
    Pending,
    Ready(Box<dyn Phase<P>>),
    /// The phase has been taken out by `poll`; only its label stays behind.
    InFlight(&'static str),
    Done,
}

struct Inner<P: Property> {
    slot: Slot<P>,
    priority: PriorityLevel,
    success: bool,
    error_cnt: u32,
    maint_status: Option<String>,
    err_status: Option<String>,
    completed: bool,
}

impl<P: Property> Inner<P> {
    /// No effect once the operation is done.
    fn set_success(&mut self, s: bool) {
        if self.is_done() {
            return;
        }
        self.success = s;
        if s {
            self.error_cnt = 0;
        }
    }

    fn is_done(&self) -> bool {
        matches!(self.slot, Slot::Done)
    }
}

/// One logical task against one device, carried out as a chain of phases.
///
/// All methods take `&self`: the polling thread calls [`poll`] while any
/// other thread may cancel with [`set_failed`] / [`set_succeeded`]. The
/// phase transition after a poll is skipped when the operation was forced
/// terminal in the meantime, so a stale in-flight phase never revives a
/// cancelled operation.
///
/// [`poll`]: Operation::poll
/// [`set_failed`]: Operation::set_failed
/// [`set_succeeded`]: Operation::set_succeeded
pub struct Operation<P: Property> {
    kind: &'static str,
    id: String,
    description: Option<String>,
    device: Arc<dyn DeviceRecord>,
    config: Arc<dyn SystemConfig>,
    phase_one: Mutex<Option<PhaseOne<P>>>,
    inner: Mutex<Inner<P>>,
}

impl<P: Property> Operation<P> {
    /// Create an operation of variant `kind` against `device`.
    ///
    /// `phase_one` is called by [`begin`](Operation::begin), not here, so
    /// protocol constructors can finish setting up the state it captures.
    /// The id defaults to the device's display name.
    pub fn new<F>(
        kind: &'static str,
        priority: PriorityLevel,
        device: Arc<dyn DeviceRecord>,
        config: Arc<dyn SystemConfig>,
        phase_one: F,
    ) -> Self
    where
        F: FnOnce() -> Box<dyn Phase<P>> + Send + 'static,
    {
        let id = device.name().to_string();
        Self {
            kind,
            id,
            description: None,
            device,
            config,
            phase_one: Mutex::new(Some(Box::new(phase_one))),
            inner: Mutex::new(Inner {
                slot: Slot::Pending,
                priority,
                success: true,
                error_cnt: 0,
                maint_status: None,
                err_status: None,
                completed: false,
            }),
        }
    }

    /// Override the operation id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach a human-readable summary, e.g. `recall preset 3`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Install the first phase. Called once, when the operation is queued.
    pub fn begin(&self) {
        let phase_one = lock(&self.phase_one).take();
        let Some(phase_one) = phase_one else {
            warn!(op_id = %self.id, kind = self.kind, "operation already begun");
            return;
        };
        let phase = phase_one();
        let mut inner = self.lock();
        if matches!(inner.slot, Slot::Pending) {
            debug!(op_id = %self.id, phase = phase.name(), "begin");
            inner.slot = Slot::Ready(phase);
        }
    }

    /// Run the current phase over `mess`.
    ///
    /// Comm and contention errors from the phase are returned untouched and
    /// leave the phase installed for a retry; the caller decides what to do
    /// with them (usually [`handle_comm_error`](Operation::handle_comm_error)).
    /// Any other phase failure fails the operation here. Polling a pending
    /// or terminal operation does nothing.
    pub fn poll(&self, mess: &mut CommMessage<'_, P>) -> Result<()> {
        let mut phase = {
            let mut inner = self.lock();
            match std::mem::replace(&mut inner.slot, Slot::Done) {
                Slot::Ready(phase) => {
                    inner.slot = Slot::InFlight(phase.name());
                    phase
                }
                other => {
                    inner.slot = other;
                    return Ok(());
                }
            }
        };

        match phase.poll(self, mess) {
            Ok(Next::Repeat) => self.update_phase(Slot::Ready(phase)),
            Ok(Next::Phase(next)) => self.update_phase(Slot::Ready(next)),
            Ok(Next::Done) => self.update_phase(Slot::Done),
            Err(PollError::Fatal(msg)) => {
                warn!(op_id = %self.id, phase = phase.name(), error = %msg, "phase failed");
                self.device
                    .log_event(CommEvent::InternalError, &self.id, &filter_msg(&msg));
                self.set_error_status(msg);
                self.set_failed();
            }
            Err(err) => {
                self.update_phase(Slot::Ready(phase));
                return Err(err);
            }
        }
        Ok(())
    }

    fn update_phase(&self, next: Slot<P>) {
        let mut inner = self.lock();
        if inner.is_done() {
            debug!(op_id = %self.id, "operation ended during poll, result dropped");
            return;
        }
        match &next {
            Slot::Ready(p) => debug!(op_id = %self.id, phase = p.name(), "next phase"),
            _ => debug!(op_id = %self.id, "last phase complete"),
        }
        inner.slot = next;
    }

    /// Force the operation to end in failure.
    pub fn set_failed(&self) {
        self.finish(false);
    }

    /// Force the operation to end in success.
    pub fn set_succeeded(&self) {
        self.finish(true);
    }

    fn finish(&self, success: bool) {
        let mut inner = self.lock();
        if inner.is_done() {
            debug!(op_id = %self.id, success, "already done, ignoring");
            return;
        }
        inner.set_success(success);
        if let Slot::InFlight(phase) = inner.slot {
            debug!(op_id = %self.id, phase, success, "terminated while phase in flight");
        }
        inner.slot = Slot::Done;
    }

    /// Record success without ending the operation. `true` clears the
    /// error counter. Ignored once the operation is done.
    pub fn set_success(&self, success: bool) {
        self.lock().set_success(success);
    }

    pub fn is_success(&self) -> bool {
        self.lock().success
    }

    pub fn is_done(&self) -> bool {
        self.lock().is_done()
    }

    pub fn state(&self) -> OpState {
        let inner = self.lock();
        match inner.slot {
            Slot::Pending => OpState::Pending,
            Slot::Ready(_) | Slot::InFlight(_) => OpState::InProgress,
            Slot::Done if inner.success => OpState::Succeeded,
            Slot::Done => OpState::Failed,
        }
    }

    pub fn priority(&self) -> PriorityLevel {
        self.lock().priority
    }

    /// Raise the priority. Requests for a less urgent level are ignored.
    pub fn set_priority(&self, priority: PriorityLevel) {
        let mut inner = self.lock();
        if priority.is_more_urgent_than(inner.priority) {
            inner.priority = priority;
        }
    }

    /// Stage maintenance text for the device. The last value wins.
    pub fn set_maint_status(&self, status: impl Into<String>) {
        self.lock().maint_status = Some(status.into());
    }

    /// Stage error text for the device. Later text is appended, comma
    /// separated; empty text after the first is ignored.
    pub fn set_error_status(&self, status: impl Into<String>) {
        let status = status.into();
        let mut inner = self.lock();
        let staged = match inner.err_status.take() {
            Some(cur) if !status.is_empty() => append_status(&cur, &status),
            Some(cur) => cur,
            None => status,
        };
        inner.err_status = Some(staged);
    }

    /// Log a comm error against the device and decide whether to retry.
    ///
    /// The current phase stays installed while the error count is below the
    /// retry threshold; reaching it fails the operation. A done operation
    /// only gets the event logged.
    pub fn handle_comm_error(&self, event: CommEvent, msg: &str) {
        self.device.log_event(event, &self.id, &filter_msg(msg));
        let threshold = self.retry_threshold();
        let errors = {
            let mut inner = self.lock();
            if inner.is_done() {
                debug!(op_id = %self.id, %event, "comm error after operation ended");
                return;
            }
            inner.error_cnt = inner.error_cnt.saturating_add(1);
            inner.error_cnt
        };
        if errors < threshold {
            debug!(op_id = %self.id, %event, errors, threshold, "retrying");
        } else {
            warn!(op_id = %self.id, %event, errors, threshold, "retry threshold reached");
            self.set_failed();
        }
    }

    /// Comm errors tolerated before failing: zero when the device is
    /// already marked failed.
    pub fn retry_threshold(&self) -> u32 {
        if self.device.is_failed() {
            0
        } else {
            self.config.retry_threshold()
        }
    }

    pub fn error_count(&self) -> u32 {
        self.lock().error_cnt
    }

    /// Flush staged status text to the device and report completion.
    ///
    /// Safe to call repeatedly. Staged text is written each time there is
    /// some; the device hears about completion only on the first call.
    pub fn cleanup(&self) {
        let (maint, err, success, notify) = {
            let mut inner = self.lock();
            if !inner.is_done() {
                debug!(op_id = %self.id, "cleanup before operation finished");
            }
            let notify = !inner.completed;
            inner.completed = true;
            (
                inner.maint_status.take(),
                inner.err_status.take(),
                inner.success,
                notify,
            )
        };
        if let Some(maint) = maint {
            self.device.set_maint_text(&filter_msg(&maint));
        }
        if let Some(err) = err {
            self.device.set_error_text(&filter_msg(&err));
        }
        if notify {
            info!(op_id = %self.id, kind = self.kind, success, "operation complete");
            self.device.complete_operation(&self.id, success);
        }
    }

    /// Variant label, e.g. `OpMoveCamera`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Summary for status displays; the variant label when none was set.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(self.kind)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device(&self) -> &Arc<dyn DeviceRecord> {
        &self.device
    }

    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        lock(&self.inner)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Same variant acting on the same device.
impl<P: Property> PartialEq for Operation<P> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.device, &other.device)
    }
}

impl<P: Property> Eq for Operation<P> {}

/// `"<phase> (<id>)"`, or the variant label when no phase is installed.
impl<P: Property> fmt::Display for Operation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.lock().slot {
            Slot::Ready(phase) => phase.name(),
            Slot::InFlight(name) => *name,
            Slot::Pending | Slot::Done => self.kind,
        };
        write!(f, "{label} ({})", self.id)
    }
}

impl<P: Property> fmt::Debug for Operation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("priority", &self.priority())
            .field("state", &self.state())
            .finish()
    }
}
