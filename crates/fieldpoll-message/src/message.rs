use bytes::BytesMut;
use tracing::trace;

use crate::error::{CommError, Result};
use crate::exchange::{Exchange, Expect};
use crate::property::Property;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// A single transport transaction scoped to one poll.
///
/// Properties are added by the phase, then sent with [`store_props`] or
/// [`query_props`]. After a query the decoded values are available through
/// [`props`] / [`props_mut`]. A message is never reused across polls.
///
/// [`store_props`]: CommMessage::store_props
/// [`query_props`]: CommMessage::query_props
/// [`props`]: CommMessage::props
/// [`props_mut`]: CommMessage::props_mut
pub struct CommMessage<'a, P> {
    link: &'a mut dyn Exchange,
    drop: u16,
    props: Vec<P>,
    buf: BytesMut,
}

impl<'a, P: Property> CommMessage<'a, P> {
    /// Create a message for the device at `drop` on `link`.
    pub fn new(link: &'a mut dyn Exchange, drop: u16) -> Self {
        Self {
            link,
            drop,
            props: Vec::new(),
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Drop address of the device being polled.
    pub fn drop_address(&self) -> u16 {
        self.drop
    }

    /// Add a property to the message.
    pub fn add(&mut self, prop: P) {
        self.props.push(prop);
    }

    /// Properties in the order they were added.
    pub fn props(&self) -> &[P] {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut [P] {
        &mut self.props
    }

    /// Consume the message and return its properties.
    pub fn into_props(self) -> Vec<P> {
        self.props
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Store every property: encode, write, then decode the acknowledgement.
    pub fn store_props(&mut self) -> Result<()> {
        for prop in &mut self.props {
            self.buf.clear();
            prop.encode_store(self.drop, &mut self.buf)?;
            let expect = prop.store_response();
            trace!(drop = self.drop, request = ?self.buf.as_ref(), ?expect, "store");
            let mut resp = self.link.exchange(&self.buf, expect)?;
            check_response_len(expect, resp.len())?;
            prop.decode_store(self.drop, &mut resp)?;
        }
        Ok(())
    }

    /// Query every property: encode the request, then decode the response
    /// into the property.
    pub fn query_props(&mut self) -> Result<()> {
        for prop in &mut self.props {
            self.buf.clear();
            prop.encode_query(self.drop, &mut self.buf)?;
            let expect = prop.query_response();
            trace!(drop = self.drop, request = ?self.buf.as_ref(), ?expect, "query");
            let mut resp = self.link.exchange(&self.buf, expect)?;
            check_response_len(expect, resp.len())?;
            trace!(drop = self.drop, response = ?resp.as_ref(), "query response");
            prop.decode_query(self.drop, &mut resp)?;
        }
        Ok(())
    }
}

fn check_response_len(expect: Expect, got: usize) -> std::result::Result<(), CommError> {
    match expect {
        Expect::Exactly(n) if n != got => Err(CommError::Parsing(format!(
            "response length {got}, expected {n}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Buf, BufMut, Bytes};

    use super::*;
    use crate::error::PollError;
    use crate::loopback::ScriptedLink;

    #[derive(Debug, Default)]
    struct Counter {
        value: u16,
    }

    impl Property for Counter {
        fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
            dst.put_u16(drop);
            dst.put_u16(self.value);
            Ok(())
        }

        fn encode_query(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
            dst.put_u16(drop);
            Ok(())
        }

        fn query_response(&self) -> Expect {
            Expect::Exactly(2)
        }

        fn decode_query(&mut self, _drop: u16, src: &mut Bytes) -> Result<()> {
            self.value = src.get_u16();
            Ok(())
        }
    }

    #[test]
    fn store_writes_each_property_in_order() {
        let mut link = ScriptedLink::new();
        let mut mess = CommMessage::new(&mut link, 7);
        mess.add(Counter { value: 1 });
        mess.add(Counter { value: 2 });
        mess.store_props().unwrap();
        drop(mess);

        assert_eq!(
            link.sent(),
            &[
                Bytes::from_static(&[0, 7, 0, 1]),
                Bytes::from_static(&[0, 7, 0, 2])
            ]
        );
    }

    #[test]
    fn query_decodes_into_property() {
        let mut link = ScriptedLink::new();
        link.push_response(vec![0x01u8, 0x2C]);
        let mut mess = CommMessage::new(&mut link, 3);
        mess.add(Counter::default());
        mess.query_props().unwrap();

        assert_eq!(mess.props()[0].value, 300);
        assert_eq!(mess.drop_address(), 3);
    }

    #[test]
    fn short_response_is_a_parsing_error() {
        let mut link = ScriptedLink::new();
        link.push_response(vec![0x01u8]);
        let mut mess = CommMessage::new(&mut link, 3);
        mess.add(Counter::default());

        let err = mess.query_props().unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Parsing(_))));
    }

    #[test]
    fn link_errors_propagate() {
        let mut link = ScriptedLink::new();
        link.push_error(CommError::Timeout);
        let mut mess = CommMessage::new(&mut link, 3);
        mess.add(Counter::default());

        let err = mess.query_props().unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Timeout)));
    }

    #[test]
    fn empty_message_sends_nothing() {
        let mut link = ScriptedLink::new();
        let mut mess: CommMessage<'_, Counter> = CommMessage::new(&mut link, 1);
        assert!(mess.is_empty());
        mess.store_props().unwrap();
        drop(mess);
        assert!(link.sent().is_empty());
    }
}
