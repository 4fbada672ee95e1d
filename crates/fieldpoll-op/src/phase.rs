use std::fmt;

use fieldpoll_message::{CommMessage, Property, Result};

use crate::operation::Operation;

/// What an operation does after a phase completes its round trip.
pub enum Next<P: Property> {
    /// Run the same phase again on the next poll (resend).
    Repeat,
    /// Continue with another phase.
    Phase(Box<dyn Phase<P>>),
    /// The operation is complete; success stays as last set.
    Done,
}

impl<P: Property> Next<P> {
    /// Continue with `phase`.
    pub fn phase(phase: impl Phase<P> + 'static) -> Self {
        Next::Phase(Box::new(phase))
    }
}

impl<P: Property> fmt::Debug for Next<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Repeat => f.write_str("Repeat"),
            Next::Phase(p) => write!(f, "Phase({})", p.name()),
            Next::Done => f.write_str("Done"),
        }
    }
}

/// One request/response step of an operation.
///
/// A phase performs exactly one round trip per poll and says what comes
/// next. Phases hold only the state they need; everything shared with the
/// rest of the operation (staged status text, success) goes through the
/// `op` handle. If `poll` fails with a comm error, the phase stays installed
/// and is polled again, so it must be safe to rerun.
pub trait Phase<P: Property>: Send {
    /// Label used in logs and the operation's `Display`.
    fn name(&self) -> &'static str;

    fn poll(&mut self, op: &Operation<P>, mess: &mut CommMessage<'_, P>) -> Result<Next<P>>;
}

/// Build a phase from a closure.
///
/// Handy for steps that need no state of their own beyond what the closure
/// captures.
pub fn phase_fn<P, F>(name: &'static str, f: F) -> Box<dyn Phase<P>>
where
    P: Property + 'static,
    F: FnMut(&Operation<P>, &mut CommMessage<'_, P>) -> Result<Next<P>> + Send + 'static,
{
    Box::new(FnPhase { name, f })
}

struct FnPhase<F> {
    name: &'static str,
    f: F,
}

impl<P, F> Phase<P> for FnPhase<F>
where
    P: Property,
    F: FnMut(&Operation<P>, &mut CommMessage<'_, P>) -> Result<Next<P>> + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn poll(&mut self, op: &Operation<P>, mess: &mut CommMessage<'_, P>) -> Result<Next<P>> {
        (self.f)(op, mess)
    }
}
