use std::fmt;

/// Kind of communication event recorded against a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommEvent {
    /// Generic link failure (disconnect, I/O).
    CommError,
    /// No response before the link timed out.
    PollTimeout,
    /// Response bytes could not be parsed.
    ParsingError,
    /// Response checksum mismatch.
    ChecksumError,
    /// Device answered with an error of its own.
    ControllerError,
    /// Phase logic failed in a way the operation cannot recover from.
    InternalError,
}

impl CommEvent {
    /// Stable name used in device event logs.
    pub fn as_str(self) -> &'static str {
        match self {
            CommEvent::CommError => "COMM_ERROR",
            CommEvent::PollTimeout => "POLL_TIMEOUT_ERROR",
            CommEvent::ParsingError => "PARSING_ERROR",
            CommEvent::ChecksumError => "CHECKSUM_ERROR",
            CommEvent::ControllerError => "CONTROLLER_ERROR",
            CommEvent::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for CommEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failures. These are retried by the operation engine
/// up to the configured threshold.
#[derive(Debug, thiserror::Error)]
pub enum CommError {
    /// The device did not answer in time.
    #[error("poll timeout")]
    Timeout,

    /// The link went away mid-exchange.
    #[error("link disconnected")]
    Disconnected,

    /// Response bytes were malformed or unexpected.
    #[error("parsing error: {0}")]
    Parsing(String),

    /// Response checksum did not match.
    #[error("checksum error: {0}")]
    Checksum(String),

    /// The drop address cannot be encoded by this protocol.
    #[error("invalid drop address: {0}")]
    InvalidAddress(u16),

    /// The device reported an error code.
    #[error("controller error: {0}")]
    Controller(String),

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommError {
    /// Event kind logged against the device for this error.
    pub fn event(&self) -> CommEvent {
        match self {
            CommError::Timeout => CommEvent::PollTimeout,
            CommError::Parsing(_) => CommEvent::ParsingError,
            CommError::Checksum(_) => CommEvent::ChecksumError,
            CommError::Controller(_) => CommEvent::ControllerError,
            CommError::Disconnected | CommError::InvalidAddress(_) | CommError::Io(_) => {
                CommEvent::CommError
            }
        }
    }

    /// True for errors raised while decoding received bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, CommError::Parsing(_) | CommError::Checksum(_))
    }
}

/// The device is busy with another request and cannot take this one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device contention: held by {holder}")]
pub struct ContentionError {
    /// Who currently holds the device.
    pub holder: String,
}

impl ContentionError {
    pub fn new(holder: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
        }
    }
}

/// Errors a phase can raise while polling.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// Transport or decoding failure, subject to retry.
    #[error(transparent)]
    Comm(#[from] CommError),

    /// Device contention, left to the scheduler.
    #[error(transparent)]
    Contention(#[from] ContentionError),

    /// Anything else that went wrong encoding, decoding or sequencing.
    /// The engine fails the operation instead of retrying.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl PollError {
    pub fn fatal(msg: impl Into<String>) -> Self {
        PollError::Fatal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
