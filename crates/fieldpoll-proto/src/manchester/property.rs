use bytes::{BufMut, BytesMut};
use fieldpoll_message::{CommError, PollError, Property, Result};

/// Highest receiver address.
pub const MAX_ADDRESS: u16 = 1024;

/// Highest preset number.
pub const MAX_PRESET: u8 = 16;

/// Flag in the second header byte selecting the extended command set.
const EXTENDED: u8 = 0x01;

const PRESET_RECALL: u8 = 0x10;
const PRESET_STORE: u8 = 0x20;

fn encode_header(drop: u16, extended: bool, dst: &mut BytesMut) -> std::result::Result<(), CommError> {
    if !(1..=MAX_ADDRESS).contains(&drop) {
        return Err(CommError::InvalidAddress(drop));
    }
    let rcv = drop - 1;
    dst.put_u8(0x80 | ((rcv >> 6) & 0x0F) as u8);
    let mut lo = ((rcv << 1) & 0x7E) as u8;
    if extended {
        lo |= EXTENDED;
    }
    dst.put_u8(lo);
    Ok(())
}

/// Recall or store a camera preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetProperty {
    store: bool,
    preset: u8,
}

impl PresetProperty {
    pub fn new(store: bool, preset: u8) -> Self {
        Self { store, preset }
    }

    pub fn is_store(&self) -> bool {
        self.store
    }

    pub fn preset(&self) -> u8 {
        self.preset
    }

    fn command(&self) -> Result<u8> {
        if !(1..=MAX_PRESET).contains(&self.preset) {
            return Err(PollError::Fatal(format!("invalid preset: {}", self.preset)));
        }
        let base = if self.store { PRESET_STORE } else { PRESET_RECALL };
        Ok(base | (self.preset - 1))
    }
}

impl Property for PresetProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        let cmd = self.command()?;
        encode_header(drop, true, dst)?;
        dst.put_u8(cmd);
        Ok(())
    }
}

/// Every property the Manchester protocol sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManchesterProperty {
    Preset(PresetProperty),
}

impl From<PresetProperty> for ManchesterProperty {
    fn from(prop: PresetProperty) -> Self {
        ManchesterProperty::Preset(prop)
    }
}

impl Property for ManchesterProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        match self {
            ManchesterProperty::Preset(p) => p.encode_store(drop, dst),
        }
    }
}
