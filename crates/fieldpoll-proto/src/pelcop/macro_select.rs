use bytes::{Buf, BufMut, Bytes, BytesMut};
use fieldpoll_message::{CommError, Expect, Property, Result};

use super::{
    check_frame, finish_frame, format_bcd2, format_bcd4, parse_bcd2, parse_bcd4, ErrorMsg, STX,
};

/// Request code for a keyboard macro selection.
pub const REQ_CODE: u8 = 0xEC;

/// Request: STX, code, mon-lo, macro (2), mon-hi, ETX, checksum.
pub const REQUEST_LEN: usize = 8;

/// Response code for a monitor status frame.
pub const STATUS_CODE: u8 = 0xB1;

const FLAG_LOGGED_IN: u8 = 0x01;

/// Macro (sequence) selection from a keyboard.
///
/// The query direction reads the keyboard's request: which monitor, which
/// macro. The store direction writes the monitor status back, including
/// any error set while handling the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSelectProp {
    logged_in: bool,
    mon_num: u32,
    mac_num: u32,
    err: Option<ErrorMsg>,
}

impl MacroSelectProp {
    pub fn new(logged_in: bool) -> Self {
        Self {
            logged_in,
            mon_num: 0,
            mac_num: 0,
            err: None,
        }
    }

    pub fn mon_num(&self) -> u32 {
        self.mon_num
    }

    pub fn mac_num(&self) -> u32 {
        self.mac_num
    }

    pub fn err(&self) -> Option<ErrorMsg> {
        self.err
    }

    pub fn set_err(&mut self, err: ErrorMsg) {
        self.err = Some(err);
    }

    /// Encode the request a keyboard sends to select macro `mac` on
    /// monitor `mon`.
    pub fn encode_request(mon: u32, mac: u32, dst: &mut BytesMut) -> Result<()> {
        let mlo = format_bcd2(mon % 100)?;
        let mhi = format_bcd2(mon / 100)?;
        let mac = format_bcd4(mac)?;
        let start = dst.len();
        dst.put_u8(STX);
        dst.put_u8(REQ_CODE);
        dst.put_u8(mlo);
        dst.put_slice(&mac);
        dst.put_u8(mhi);
        finish_frame(dst, start);
        Ok(())
    }
}

impl Property for MacroSelectProp {
    /// Monitor status frame.
    fn encode_store(&self, _drop: u16, dst: &mut BytesMut) -> Result<()> {
        let mlo = format_bcd2(self.mon_num % 100)?;
        let mhi = format_bcd2(self.mon_num / 100)?;
        let start = dst.len();
        dst.put_u8(STX);
        dst.put_u8(STATUS_CODE);
        dst.put_u8(if self.logged_in { FLAG_LOGGED_IN } else { 0 });
        dst.put_u8(mlo);
        dst.put_u8(mhi);
        dst.put_u8(self.err.map_or(0, ErrorMsg::code));
        finish_frame(dst, start);
        Ok(())
    }

    /// The keyboard speaks first; nothing is sent.
    fn encode_query(&self, _drop: u16, _dst: &mut BytesMut) -> Result<()> {
        Ok(())
    }

    fn query_response(&self) -> Expect {
        Expect::Exactly(REQUEST_LEN)
    }

    fn decode_query(&mut self, _drop: u16, src: &mut Bytes) -> Result<()> {
        check_frame(src.as_ref(), REQUEST_LEN)?;
        src.advance(1);
        let code = src.get_u8();
        if code != REQ_CODE {
            return Err(CommError::Parsing(format!("unexpected request code {code:#04x}")).into());
        }
        let mlo = parse_bcd2(src)?;
        let mac = parse_bcd4(src)?;
        let mhi = parse_bcd2(src)?;
        self.mon_num = 100 * mhi + mlo;
        self.mac_num = mac;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fieldpoll_message::PollError;

    use super::super::{checksum, ETX};
    use super::*;

    fn request(mon: u32, mac: u32) -> Bytes {
        let mut buf = BytesMut::new();
        MacroSelectProp::encode_request(mon, mac, &mut buf).unwrap();
        buf.freeze()
    }

    #[test]
    fn request_layout() {
        let req = request(1234, 56);
        assert_eq!(req.len(), REQUEST_LEN);
        assert_eq!(&req[..7], &[STX, REQ_CODE, 0x34, 0x00, 0x56, 0x12, ETX]);
        assert_eq!(req[7], checksum(&req[..7]));
    }

    #[test]
    fn decodes_monitor_and_macro() {
        let mut prop = MacroSelectProp::new(true);
        let mut src = request(1234, 56);
        prop.decode_query(0, &mut src).unwrap();
        assert_eq!(prop.mon_num(), 1234);
        assert_eq!(prop.mac_num(), 56);
        assert_eq!(prop.err(), None);
    }

    #[test]
    fn checksum_mismatch() {
        let mut raw = request(7, 3).to_vec();
        raw[7] ^= 0x01;
        let mut prop = MacroSelectProp::new(true);
        let err = prop.decode_query(0, &mut Bytes::from(raw)).unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Checksum(_))));
    }

    #[test]
    fn wrong_request_code() {
        let mut raw = request(7, 3).to_vec();
        raw[1] = 0xED;
        raw[7] = checksum(&raw[..7]);
        let mut prop = MacroSelectProp::new(true);
        let err = prop.decode_query(0, &mut Bytes::from(raw)).unwrap_err();
        assert!(matches!(err, PollError::Comm(CommError::Parsing(_))));
    }

    #[test]
    fn status_carries_error_code() {
        let mut prop = MacroSelectProp::new(true);
        prop.decode_query(0, &mut request(105, 9)).unwrap();
        prop.set_err(ErrorMsg::MacNotPresent);

        let mut buf = BytesMut::new();
        prop.encode_store(0, &mut buf).unwrap();
        assert_eq!(&buf[..7], &[STX, STATUS_CODE, 0x01, 0x05, 0x01, 0x05, ETX]);
        assert_eq!(buf[7], checksum(&buf[..7]));
    }

    #[test]
    fn query_sends_nothing() {
        let prop = MacroSelectProp::new(false);
        let mut buf = BytesMut::new();
        prop.encode_query(0, &mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(prop.query_response(), Expect::Exactly(REQUEST_LEN));
    }
}
