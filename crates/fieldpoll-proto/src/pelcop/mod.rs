//! Pelco-P keyboard protocol, server side.
//!
//! Here the keyboard asks and fieldpoll answers: each poll reads one request
//! frame from the keyboard and writes back a monitor status frame. Frames
//! are `STX, code, payload.., ETX, checksum`, with an XOR checksum over
//! every byte before it. Monitor and macro numbers travel as packed BCD.

mod macro_select;
mod monitor;
mod op_macro_select;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use fieldpoll_message::{require, CommError, Expect, PollError, Property, Result};

pub use macro_select::MacroSelectProp;
pub use monitor::{MemoryMonitor, MonitorDirectory, MonitorSet, VideoMonitor};
pub use op_macro_select::op_macro_select;

/// Start of frame.
pub const STX: u8 = 0xA0;

/// End of frame; the checksum follows it.
pub const ETX: u8 = 0xAF;

/// Error codes carried back to the keyboard in a monitor status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorMsg {
    CamNotPresent = 0x01,
    MonNotPresent = 0x02,
    NoPrivilege = 0x03,
    MonLocked = 0x04,
    MacNotPresent = 0x05,
}

impl ErrorMsg {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(ErrorMsg::CamNotPresent),
            0x02 => Some(ErrorMsg::MonNotPresent),
            0x03 => Some(ErrorMsg::NoPrivilege),
            0x04 => Some(ErrorMsg::MonLocked),
            0x05 => Some(ErrorMsg::MacNotPresent),
            _ => None,
        }
    }
}

/// XOR of every byte in `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Parse one packed BCD byte (00..=99).
pub fn parse_bcd2(src: &mut impl Buf) -> std::result::Result<u32, CommError> {
    require(src, 1, "BCD")?;
    let b = src.get_u8();
    let (hi, lo) = (b >> 4, b & 0x0F);
    if hi > 9 || lo > 9 {
        return Err(CommError::Parsing(format!("invalid BCD: {b:#04x}")));
    }
    Ok(u32::from(hi) * 10 + u32::from(lo))
}

/// Parse two packed BCD bytes, high digits first (0000..=9999).
pub fn parse_bcd4(src: &mut impl Buf) -> std::result::Result<u32, CommError> {
    let hi = parse_bcd2(src)?;
    let lo = parse_bcd2(src)?;
    Ok(hi * 100 + lo)
}

/// Pack `value` (0..=99) into one BCD byte.
pub fn format_bcd2(value: u32) -> Result<u8> {
    if value > 99 {
        return Err(PollError::Fatal(format!("BCD2 out of range: {value}")));
    }
    Ok((((value / 10) << 4) | (value % 10)) as u8)
}

/// Pack `value` (0..=9999) into two BCD bytes, high digits first.
pub fn format_bcd4(value: u32) -> Result<[u8; 2]> {
    if value > 9999 {
        return Err(PollError::Fatal(format!("BCD4 out of range: {value}")));
    }
    Ok([format_bcd2(value / 100)?, format_bcd2(value % 100)?])
}

/// Check framing and checksum of a complete `len`-byte frame.
fn check_frame(frame: &[u8], len: usize) -> std::result::Result<(), CommError> {
    if frame.len() != len {
        return Err(CommError::Parsing(format!(
            "frame length {}, expected {len}",
            frame.len()
        )));
    }
    if frame[0] != STX {
        return Err(CommError::Parsing(format!("bad STX: {:#04x}", frame[0])));
    }
    if frame[len - 2] != ETX {
        return Err(CommError::Parsing(format!("bad ETX: {:#04x}", frame[len - 2])));
    }
    let expected = checksum(&frame[..len - 1]);
    let got = frame[len - 1];
    if got != expected {
        return Err(CommError::Checksum(format!(
            "expected {expected:#04x}, got {got:#04x}"
        )));
    }
    Ok(())
}

/// Close a frame started at `start`: ETX, then the checksum.
fn finish_frame(dst: &mut BytesMut, start: usize) {
    dst.put_u8(ETX);
    let chk = checksum(&dst[start..]);
    dst.put_u8(chk);
}

/// Every property the Pelco-P keyboard side handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PelcoPProperty {
    MacroSelect(MacroSelectProp),
}

impl From<MacroSelectProp> for PelcoPProperty {
    fn from(prop: MacroSelectProp) -> Self {
        PelcoPProperty::MacroSelect(prop)
    }
}

impl Property for PelcoPProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        match self {
            PelcoPProperty::MacroSelect(p) => p.encode_store(drop, dst),
        }
    }

    fn store_response(&self) -> Expect {
        match self {
            PelcoPProperty::MacroSelect(p) => p.store_response(),
        }
    }

    fn encode_query(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        match self {
            PelcoPProperty::MacroSelect(p) => p.encode_query(drop, dst),
        }
    }

    fn query_response(&self) -> Expect {
        match self {
            PelcoPProperty::MacroSelect(p) => p.query_response(),
        }
    }

    fn decode_query(&mut self, drop: u16, src: &mut Bytes) -> Result<()> {
        match self {
            PelcoPProperty::MacroSelect(p) => p.decode_query(drop, src),
        }
    }
}
