use bytes::BytesMut;
use fieldpoll_message::{PollError, Property, Result};

use super::encode_frame;

const STORE: u8 = 0x03;
const RECALL: u8 = 0x07;

/// Recall or store a camera preset (1..=255).
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
}

impl Property for PresetProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        if self.preset == 0 {
            return Err(PollError::fatal("invalid preset: 0"));
        }
        let cmd2 = if self.store { STORE } else { RECALL };
        encode_frame(drop, 0, cmd2, 0, self.preset, dst)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_and_store() {
        let mut buf = BytesMut::new();
        PresetProperty::new(false, 3).encode_store(1, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xFFu8, 0x01, 0x00, 0x07, 0x00, 0x03, 0x0B]);

        buf.clear();
        PresetProperty::new(true, 3).encode_store(1, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xFFu8, 0x01, 0x00, 0x03, 0x00, 0x03, 0x07]);
    }

    #[test]
    fn preset_zero_is_fatal() {
        let mut buf = BytesMut::new();
        let err = PresetProperty::new(false, 0).encode_store(1, &mut buf).unwrap_err();
        assert!(matches!(err, PollError::Fatal(_)));
    }
}
