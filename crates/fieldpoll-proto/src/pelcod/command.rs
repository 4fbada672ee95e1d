use bytes::BytesMut;
use fieldpoll_message::{Property, Result};

use super::encode_frame;

const FOCUS_NEAR: u8 = 0x01;
const IRIS_OPEN: u8 = 0x02;
const IRIS_CLOSE: u8 = 0x04;

const PAN_RIGHT: u8 = 0x02;
const PAN_LEFT: u8 = 0x04;
const TILT_UP: u8 = 0x08;
const TILT_DOWN: u8 = 0x10;
const ZOOM_TELE: u8 = 0x20;
const ZOOM_WIDE: u8 = 0x40;
const FOCUS_FAR: u8 = 0x80;

/// Pan speed 0x40 is "turbo".
const MAX_PAN_SPEED: u32 = 0x40;
const MAX_TILT_SPEED: u32 = 0x3F;

/// Pan/tilt/zoom/focus/iris command.
///
/// Signs give direction (positive pans right, tilts up, zooms in, focuses
/// far, opens the iris); magnitudes of pan and tilt give speed. All zero
/// means stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandProperty {
    pan: i32,
    tilt: i32,
    zoom: i32,
    focus: i32,
    iris: i32,
}

impl CommandProperty {
    pub fn new(pan: i32, tilt: i32, zoom: i32, focus: i32, iris: i32) -> Self {
        Self {
            pan,
            tilt,
            zoom,
            focus,
            iris,
        }
    }

    pub fn stop() -> Self {
        Self::default()
    }

    pub fn is_stop(&self) -> bool {
        *self == Self::stop()
    }

    pub fn pan(&self) -> i32 {
        self.pan
    }

    pub fn tilt(&self) -> i32 {
        self.tilt
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    fn command1(&self) -> u8 {
        let mut cmd = 0;
        if self.focus < 0 {
            cmd |= FOCUS_NEAR;
        }
        if self.iris > 0 {
            cmd |= IRIS_OPEN;
        } else if self.iris < 0 {
            cmd |= IRIS_CLOSE;
        }
        cmd
    }

    fn command2(&self) -> u8 {
        let mut cmd = 0;
        if self.pan > 0 {
            cmd |= PAN_RIGHT;
        } else if self.pan < 0 {
            cmd |= PAN_LEFT;
        }
        if self.tilt > 0 {
            cmd |= TILT_UP;
        } else if self.tilt < 0 {
            cmd |= TILT_DOWN;
        }
        if self.zoom > 0 {
            cmd |= ZOOM_TELE;
        } else if self.zoom < 0 {
            cmd |= ZOOM_WIDE;
        }
        if self.focus > 0 {
            cmd |= FOCUS_FAR;
        }
        cmd
    }

    fn pan_speed(&self) -> u8 {
        self.pan.unsigned_abs().min(MAX_PAN_SPEED) as u8
    }

    fn tilt_speed(&self) -> u8 {
        self.tilt.unsigned_abs().min(MAX_TILT_SPEED) as u8
    }
}

impl Property for CommandProperty {
    fn encode_store(&self, drop: u16, dst: &mut BytesMut) -> Result<()> {
        encode_frame(
            drop,
            self.command1(),
            self.command2(),
            self.pan_speed(),
            self.tilt_speed(),
            dst,
        )?;
        Ok(())
    }
}
