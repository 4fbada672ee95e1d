use std::sync::Arc;

use fieldpoll_message::{CommMessage, Exchange, PollError, Property};
use serde::Serialize;
use tracing::debug;

use crate::operation::Operation;
use crate::queue::OpQueue;

/// What one [`LinkDriver::poll_once`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing was queued.
    Idle,
    /// The operation advanced and went back on the queue.
    Continued,
    /// The operation hit a comm error and will retry.
    Retrying,
    /// The device was busy; the operation went back on the queue untouched.
    Deferred,
    /// The operation finished and was cleaned up.
    Completed { success: bool },
}

/// Totals from [`LinkDriver::run_until_idle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub polls: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Polls queued operations over a single link, one round trip at a time.
pub struct LinkDriver<P: Property, X: Exchange> {
    link: X,
    queue: OpQueue<P>,
}

impl<P: Property, X: Exchange> LinkDriver<P, X> {
    pub fn new(link: X) -> Self {
        Self {
            link,
            queue: OpQueue::new(),
        }
    }

    /// Queue and begin `op`. Returns `false` if an equal operation is
    /// already queued; the rejected operation is left untouched.
    pub fn submit(&mut self, op: Arc<Operation<P>>) -> bool {
        if !self.queue.push(Arc::clone(&op)) {
            return false;
        }
        op.begin();
        true
    }

    /// Poll the most urgent queued operation once.
    pub fn poll_once(&mut self) -> PollOutcome {
        let Some(op) = self.queue.pop_next() else {
            return PollOutcome::Idle;
        };

        let drop = op.device().drop_address();
        let result = {
            let mut mess = CommMessage::new(&mut self.link, drop);
            op.poll(&mut mess)
        };

        let mut retrying = false;
        match result {
            // `Operation::poll` fails the operation itself on a fatal error.
            Ok(()) | Err(PollError::Fatal(_)) => {}
            Err(PollError::Comm(err)) => {
                debug!(op_id = op.id(), error = %err, "comm error");
                op.handle_comm_error(err.event(), &err.to_string());
                retrying = !op.is_done();
            }
            Err(PollError::Contention(err)) => {
                debug!(op_id = op.id(), holder = %err.holder, "device busy, deferring");
                self.queue.requeue(op);
                return PollOutcome::Deferred;
            }
        }

        if op.is_done() {
            op.cleanup();
            PollOutcome::Completed {
                success: op.is_success(),
            }
        } else {
            self.queue.requeue(op);
            if retrying {
                PollOutcome::Retrying
            } else {
                PollOutcome::Continued
            }
        }
    }

    /// Poll until the queue is empty, or until every queued operation has
    /// been deferred in a row.
    pub fn run_until_idle(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut deferred = 0;
        loop {
            let outcome = self.poll_once();
            if outcome == PollOutcome::Idle {
                break;
            }
            summary.polls += 1;
            match outcome {
                PollOutcome::Deferred => {
                    deferred += 1;
                    if deferred >= self.queue.len() {
                        debug!(queued = self.queue.len(), "all queued operations deferred");
                        break;
                    }
                }
                PollOutcome::Completed { success } => {
                    deferred = 0;
                    summary.completed += 1;
                    if !success {
                        summary.failed += 1;
                    }
                }
                _ => deferred = 0,
            }
        }
        summary
    }

    pub fn link(&self) -> &X {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut X {
        &mut self.link
    }

    pub fn queue(&self) -> &OpQueue<P> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut OpQueue<P> {
        &mut self.queue
    }

    pub fn into_link(self) -> X {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use std::sync::Barrier;
    use std::thread;

    use fieldpoll_message::{CommError, CommEvent, ContentionError, Result, ScriptedLink};

    use super::*;
    use crate::config::{EngineConfig, SystemConfig};
    use crate::device::MemoryDevice;
    use crate::operation::OpState;
    use crate::phase::{phase_fn, Next};
    use crate::priority::PriorityLevel;

    #[derive(Debug)]
    struct Byte(u8);

    impl Property for Byte {
        fn encode_store(&self, _drop: u16, dst: &mut BytesMut) -> Result<()> {
            dst.extend_from_slice(&[self.0]);
            Ok(())
        }
    }

    fn send_op(dev: &Arc<MemoryDevice>, kind: &'static str, byte: u8) -> Arc<Operation<Byte>> {
        let config: Arc<dyn SystemConfig> = Arc::new(EngineConfig { retry_threshold: 3 });
        Arc::new(Operation::new(kind, PriorityLevel::Command, dev.clone(), config, move || {
            phase_fn("Send", move |_op: &Operation<Byte>, mess: &mut CommMessage<'_, Byte>| {
                mess.add(Byte(byte));
                mess.store_props()?;
                Ok(Next::Done)
            })
        }))
    }

    #[test]
    fn idle_when_empty() {
        let mut driver: LinkDriver<Byte, _> = LinkDriver::new(ScriptedLink::new());
        assert_eq!(driver.poll_once(), PollOutcome::Idle);
        assert_eq!(driver.run_until_idle(), RunSummary::default());
    }

    #[test]
    fn completes_and_reports() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let mut driver = LinkDriver::new(ScriptedLink::new());
        assert!(driver.submit(send_op(&dev, "OpSend", 0x55)));

        assert_eq!(driver.poll_once(), PollOutcome::Completed { success: true });
        assert!(driver.queue().is_empty());
        assert_eq!(dev.completions(), vec![("CAM_007".to_string(), true)]);
        assert_eq!(driver.link().sent()[0].as_ref(), &[0x55u8]);
    }

    #[test]
    fn timeouts_retry_then_fail() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let mut link = ScriptedLink::new();
        link.push_timeouts(3);
        let mut driver = LinkDriver::new(link);
        driver.submit(send_op(&dev, "OpSend", 1));

        assert_eq!(driver.poll_once(), PollOutcome::Retrying);
        assert_eq!(driver.poll_once(), PollOutcome::Retrying);
        assert_eq!(driver.poll_once(), PollOutcome::Completed { success: false });

        let events = dev.events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.event == CommEvent::PollTimeout));
        assert_eq!(dev.completions(), vec![("CAM_007".to_string(), false)]);
    }

    #[test]
    fn contention_defers_without_error() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let mut link = ScriptedLink::new();
        link.push_error(ContentionError::new("OpQueryStatus"));
        let mut driver = LinkDriver::new(link);
        let op = send_op(&dev, "OpSend", 1);
        driver.submit(Arc::clone(&op));

        assert_eq!(driver.poll_once(), PollOutcome::Deferred);
        assert_eq!(op.error_count(), 0);
        assert!(dev.events().is_empty());
        assert_eq!(driver.poll_once(), PollOutcome::Completed { success: true });
    }

    #[test]
    fn run_stops_when_everything_is_deferred() {
        let (a, b) = (
            Arc::new(MemoryDevice::new("a", 1)),
            Arc::new(MemoryDevice::new("b", 2)),
        );
        let mut link = ScriptedLink::new();
        for _ in 0..4 {
            link.push_error(ContentionError::new("other"));
        }
        let mut driver = LinkDriver::new(link);
        driver.submit(send_op(&a, "OpSend", 1));
        driver.submit(send_op(&b, "OpSend", 2));

        let summary = driver.run_until_idle();
        assert_eq!(summary.polls, 2);
        assert_eq!(summary.completed, 0);
        assert_eq!(driver.queue().len(), 2);

        assert_eq!(driver.link().remaining(), 2);
    }

    #[test]
    fn run_counts_failures() {
        let (a, b) = (
            Arc::new(MemoryDevice::new("a", 1)),
            Arc::new(MemoryDevice::new("b", 2)),
        );
        b.set_failed(true);
        let mut link = ScriptedLink::new();
        link.push_timeouts(1);
        let mut driver = LinkDriver::new(link);
        driver.submit(send_op(&b, "OpSend", 2));
        driver.submit(send_op(&a, "OpSend", 1));

        let summary = driver.run_until_idle();
        assert_eq!(
            summary,
            RunSummary {
                polls: 2,
                completed: 2,
                failed: 1
            }
        );
        assert_eq!(b.completions(), vec![("b".to_string(), false)]);
        assert_eq!(a.completions(), vec![("a".to_string(), true)]);
    }

    #[test]
    fn duplicate_submit_is_rejected() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let mut driver = LinkDriver::new(ScriptedLink::new());
        assert!(driver.submit(send_op(&dev, "OpSend", 1)));
        let dup = send_op(&dev, "OpSend", 2);
        assert!(!driver.submit(Arc::clone(&dup)));
        assert_eq!(dup.state(), OpState::Pending);
    }

    #[test]
    fn fatal_phase_error_completes_as_failure() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let config: Arc<dyn SystemConfig> = Arc::new(EngineConfig { retry_threshold: 3 });
        let op = Arc::new(Operation::new(
            "OpBroken",
            PriorityLevel::Command,
            dev.clone(),
            config,
            || {
                phase_fn("Broken", |_op: &Operation<Byte>, _mess: &mut CommMessage<'_, Byte>| {
                    Err(PollError::fatal("bad state"))
                })
            },
        ));
        let mut driver = LinkDriver::new(ScriptedLink::new());
        driver.submit(op);

        assert_eq!(driver.poll_once(), PollOutcome::Completed { success: false });
        let events = dev.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, CommEvent::InternalError);
        assert_eq!(dev.error_text().as_deref(), Some("bad state"));
    }

    #[test]
    fn comm_error_after_cancel_keeps_success() {
        let dev = Arc::new(MemoryDevice::new("CAM_007", 7));
        let config: Arc<dyn SystemConfig> = Arc::new(EngineConfig { retry_threshold: 1 });
        let gate = Arc::new(Barrier::new(2));
        let phase_gate = Arc::clone(&gate);
        let op = Arc::new(Operation::new(
            "OpSlow",
            PriorityLevel::Command,
            dev.clone(),
            config,
            move || {
                phase_fn("Slow", move |_op: &Operation<Byte>, mess: &mut CommMessage<'_, Byte>| {
                    phase_gate.wait();
                    phase_gate.wait();
                    mess.add(Byte(1));
                    mess.store_props()?;
                    Ok(Next::Done)
                })
            },
        ));

        let mut link = ScriptedLink::new();
        link.push_error(CommError::Timeout);
        let mut driver = LinkDriver::new(link);
        driver.submit(Arc::clone(&op));

        let poller = thread::spawn(move || driver.poll_once());
        gate.wait();
        op.set_succeeded();
        gate.wait();

        assert_eq!(
            poller.join().unwrap(),
            PollOutcome::Completed { success: true }
        );
        assert_eq!(op.state(), OpState::Succeeded);
        assert_eq!(op.error_count(), 0);
        assert_eq!(dev.events()[0].event, CommEvent::PollTimeout);
        assert_eq!(dev.completions(), vec![("CAM_007".to_string(), true)]);
    }
}
