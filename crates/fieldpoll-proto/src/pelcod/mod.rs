//! Pelco-D camera protocol.
//!
//! Every message is a 7-byte frame:
//! `0xFF, address, cmd1, cmd2, data1, data2, checksum`, where the checksum
//! is the sum of bytes 1 through 5 modulo 256. Cameras do not acknowledge
//! commands, so all properties are write-only.

mod command;
mod op_move_camera;
mod op_preset;
mod preset;

use bytes::{BufMut, BytesMut};
use fieldpoll_message::{CommError, Property, Result};

pub use command::CommandProperty;
pub use op_move_camera::{op_move_camera, PAN_RANGE, TZ_RANGE};
pub use op_preset::op_preset;
pub use preset::PresetProperty;

/// First byte of every frame.
pub const SYNC: u8 = 0xFF;

/// Highest camera address.
pub const MAX_ADDRESS: u16 = 254;

pub const FRAME_LEN: usize = 7;

fn encode_frame(
    drop: u16,
    cmd1: u8,
    cmd2: u8,
    data1: u8,
    data2: u8,
    dst: &mut BytesMut,
) -> std::result::Result<(), CommError> {
    if !(1..=MAX_ADDRESS).contains(&drop) {
        return Err(CommError::InvalidAddress(drop));
    }
    let body = [drop as u8, cmd1, cmd2, data1, data2];
    let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    dst.reserve(FRAME_LEN);
    dst.put_u8(SYNC);
    dst.put_slice(&body);
    dst.put_u8(sum);
    Ok(())
}

/// Every property the Pelco-D protocol sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PelcoDProperty {
    Command(CommandProperty),
    Preset(PresetProperty),
}

impl From<CommandProperty> for PelcoDProperty {
    fn from(prop: CommandProperty) -> Self {
        PelcoDProperty::Command(prop)
    }
}

impl From<PresetProperty> for PelcoDProperty {
    fn from(prop: PresetProperty) -> Self {
        PelcoDProperty::Preset(prop)
    }
}

impl Property for PelcoDProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        match self {
            PelcoDProperty::Command(p) => p.encode_store(drop, dst),
            PelcoDProperty::Preset(p) => p.encode_store(drop, dst),
        }
    }
}
