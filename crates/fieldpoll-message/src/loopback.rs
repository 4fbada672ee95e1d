//! In-memory link that replays a script of responses.

use std::collections::VecDeque;

use bytes::Bytes;
use tracing::debug;

use crate::error::{CommError, PollError, Result};
use crate::exchange::{Exchange, Expect};

/// An [`Exchange`] that records every request and answers from a script.
///
/// Scripted errors are returned by the next exchange whatever it expects.
/// Scripted responses are only consumed by exchanges that read one; a
/// write-only request leaves them queued. A read with an empty script
/// times out.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    sent: Vec<Bytes>,
    script: VecDeque<Result<Bytes>>,
    exchanges: usize,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next reading exchange.
    pub fn push_response(&mut self, resp: impl Into<Bytes>) {
        self.script.push_back(Ok(resp.into()));
    }

    /// Queue an error for the next exchange.
    pub fn push_error(&mut self, err: impl Into<PollError>) {
        self.script.push_back(Err(err.into()));
    }

    /// Queue `n` timeouts.
    pub fn push_timeouts(&mut self, n: usize) {
        for _ in 0..n {
            self.push_error(CommError::Timeout);
        }
    }

    /// Non-empty requests written so far, oldest first.
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    /// Total number of exchanges attempted, including failed ones.
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    /// Scripted entries not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Exchange for ScriptedLink {
    fn exchange(&mut self, request: &[u8], expect: Expect) -> Result<Bytes> {
        self.exchanges += 1;
        if !request.is_empty() {
            self.sent.push(Bytes::copy_from_slice(request));
        }
        if matches!(self.script.front(), Some(Err(_))) {
            if let Some(Err(err)) = self.script.pop_front() {
                debug!(error = %err, "scripted link error");
                return Err(err);
            }
        }
        if expect.is_nothing() {
            return Ok(Bytes::new());
        }
        match self.script.pop_front() {
            Some(resp) => resp,
            None => Err(CommError::Timeout.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentionError;

    #[test]
    fn write_only_leaves_responses_queued() {
        let mut link = ScriptedLink::new();
        link.push_response(vec![1u8, 2]);

        let resp = link.exchange(b"abc", Expect::Nothing).unwrap();
        assert!(resp.is_empty());
        assert_eq!(link.remaining(), 1);

        let resp = link.exchange(b"", Expect::Exactly(2)).unwrap();
        assert_eq!(resp.as_ref(), &[1u8, 2]);
        assert_eq!(link.sent(), &[Bytes::from_static(b"abc")]);
        assert_eq!(link.exchanges(), 2);
    }

    #[test]
    fn errors_are_returned_even_for_writes() {
        let mut link = ScriptedLink::new();
        link.push_timeouts(1);
        link.push_error(ContentionError::new("other"));

        let err = link.exchange(b"x", Expect::Nothing).unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Timeout)));
        let err = link.exchange(b"x", Expect::Nothing).unwrap_err();
        assert!(matches!(err, PollError::Contention(_)));
        assert!(link.exchange(b"x", Expect::Nothing).is_ok());
    }

    #[test]
    fn empty_script_times_out_reads() {
        let mut link = ScriptedLink::new();
        let err = link.exchange(b"q", Expect::Exactly(4)).unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Timeout)));
    }
}
