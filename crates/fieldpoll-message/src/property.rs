use std::fmt;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{CommError, PollError, Result};
use crate::exchange::Expect;

/// A protocol-specific command or response unit.
///
/// Each protocol defines its own property type (usually an enum over the
/// messages it supports) with a binary wire representation. The engine never
/// looks at the bytes; it only asks a property to encode itself for a store
/// or query request and to decode the matching response.
///
/// Directions a property does not support keep the default, which fails the
/// operation: asking a write-only property for a query is a programming error,
/// not a link problem.
pub trait Property: fmt::Debug + Send {
    /// Encode a STORE request addressed to `drop`.
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        let _ = (drop, dst);
        Err(PollError::fatal("STORE not supported"))
    }

    /// Response expected after a STORE request.
    fn store_response(&self) -> Expect {
        Expect::Nothing
    }

    /// Decode the response to a STORE request.
    fn decode_store(&mut self, drop: u16, src: &mut Bytes) -> Result<()> {
        let _ = (drop, src);
        Ok(())
    }

    /// Encode a QUERY request addressed to `drop`.
    fn encode_query(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        let _ = (drop, dst);
        Err(PollError::fatal("QUERY not supported"))
    }

    /// Response expected after a QUERY request.
    fn query_response(&self) -> Expect {
        Expect::Nothing
    }

    /// Decode the response to a QUERY request into this property.
    fn decode_query(&mut self, drop: u16, src: &mut Bytes) -> Result<()> {
        let _ = (drop, src);
        Err(PollError::fatal("QUERY not supported"))
    }
}

/// Check that `src` still holds at least `n` bytes for `field`.
pub fn require(src: &impl Buf, n: usize, field: &str) -> std::result::Result<(), CommError> {
    if src.remaining() < n {
        return Err(CommError::Parsing(format!(
            "{field}: need {n} bytes, have {}",
            src.remaining()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct WriteOnly;

    impl Property for WriteOnly {
        fn encode_store(&self, _drop: u16, dst: &mut BytesMut) -> Result<()> {
            dst.extend_from_slice(b"w");
            Ok(())
        }
    }

    #[test]
    fn unsupported_query_is_fatal() {
        let prop = WriteOnly;
        let mut buf = BytesMut::new();
        let err = prop.encode_query(1, &mut buf).unwrap_err();
        assert!(matches!(err, PollError::Fatal(msg) if msg == "QUERY not supported"));
    }

    #[test]
    fn store_decode_defaults_to_accepting() {
        let mut prop = WriteOnly;
        let mut src = Bytes::new();
        assert!(prop.decode_store(1, &mut src).is_ok());
        assert_eq!(prop.store_response(), Expect::Nothing);
    }

    #[test]
    fn require_reports_short_buffers() {
        let src = Bytes::from_static(&[1, 2]);
        assert!(require(&src, 2, "header").is_ok());
        let err = require(&src, 3, "header").unwrap_err();
        assert!(matches!(err, CommError::Parsing(msg) if msg == "header: need 3 bytes, have 2"));
    }
}
