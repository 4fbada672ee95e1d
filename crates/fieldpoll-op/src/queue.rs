use std::sync::Arc;

use fieldpoll_message::Property;
use tracing::debug;

use crate::operation::Operation;

struct Entry<P: Property> {
    seq: u64,
    op: Arc<Operation<P>>,
}

/// Pending operations for one link, ordered by priority and then by arrival.
///
/// An operation equal to one already queued (same variant, same device) is
/// rejected. Operations that finished while queued, for instance because
/// another thread cancelled them, are cleaned up and skipped on the way out.
pub struct OpQueue<P: Property> {
    entries: Vec<Entry<P>>,
    next_seq: u64,
}

impl<P: Property> OpQueue<P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Queue `op`. Returns `false` if an equal operation is already queued.
    pub fn push(&mut self, op: Arc<Operation<P>>) -> bool {
        if self.contains(&op) {
            debug!(op = %op, "equal operation already queued");
            return false;
        }
        self.requeue(op);
        true
    }

    /// Put an operation back after a poll, behind others of the same priority.
    pub(crate) fn requeue(&mut self, op: Arc<Operation<P>>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { seq, op });
    }

    /// Remove and return the most urgent live operation.
    pub fn pop_next(&mut self) -> Option<Arc<Operation<P>>> {
        loop {
            let idx = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| (e.op.priority(), e.seq))
                .map(|(i, _)| i)?;
            let entry = self.entries.remove(idx);
            if !entry.op.is_done() {
                return Some(entry.op);
            }
            debug!(op_id = entry.op.id(), "skipping finished operation");
            entry.op.cleanup();
        }
    }

    pub fn contains(&self, op: &Operation<P>) -> bool {
        self.entries.iter().any(|e| *e.op == *op)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fail and clean up everything queued. Returns how many were dropped.
    pub fn drain(&mut self) -> usize {
        let n = self.entries.len();
        for entry in self.entries.drain(..) {
            entry.op.set_failed();
            entry.op.cleanup();
        }
        n
    }
}

impl<P: Property> Default for OpQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
