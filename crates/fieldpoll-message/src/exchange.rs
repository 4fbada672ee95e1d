use bytes::Bytes;

use crate::error::Result;

/// What a request expects to read back from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Write-only; no response is read.
    Nothing,
    /// A fixed-length response of exactly this many bytes.
    Exactly(usize),
}

impl Expect {
    /// Number of bytes to read, zero for write-only requests.
    pub fn len(self) -> usize {
        match self {
            Expect::Nothing => 0,
            Expect::Exactly(n) => n,
        }
    }

    pub fn is_nothing(self) -> bool {
        matches!(self, Expect::Nothing)
    }
}

/// One request/response round trip over a device link.
///
/// Implementations own the link: sockets, serial ports, multiplexers.
/// An empty `request` means nothing is written and only a response is read
/// (devices that initiate traffic, like keyboards).
///
/// Timeouts are the implementation's job; the engine never waits on its own.
pub trait Exchange {
    fn exchange(&mut self, request: &[u8], expect: Expect) -> Result<Bytes>;
}

impl<X: Exchange + ?Sized> Exchange for &mut X {
    fn exchange(&mut self, request: &[u8], expect: Expect) -> Result<Bytes> {
        (**self).exchange(request, expect)
    }
}

impl<X: Exchange + ?Sized> Exchange for Box<X> {
    fn exchange(&mut self, request: &[u8], expect: Expect) -> Result<Bytes> {
        (**self).exchange(request, expect)
    }
}
