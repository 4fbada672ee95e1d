use std::sync::Arc;

use fieldpoll_message::CommMessage;
use fieldpoll_op::{DeviceRecord, Next, Operation, Phase, PriorityLevel, Result, SystemConfig};

use super::command::CommandProperty;
use super::PelcoDProperty;

/// Pan steps, including the "turbo" speed of 64.
pub const PAN_RANGE: i32 = 65;

/// Tilt and zoom steps.
pub const TZ_RANGE: i32 = 64;

/// Times a stop command goes out, in case one is lost.
const STOP_SENDS: u32 = 2;

/// Map a value in -1.0..=1.0 onto `-(range - 1)..=(range - 1)`.
fn map_float(value: f32, range: i32) -> i32 {
    (value.clamp(-1.0, 1.0) * (range - 1) as f32).round() as i32
}

/// Build an operation to start (or stop) continuous camera movement.
///
/// Each axis runs from -1.0 to 1.0; values outside are clamped. All zeros is
/// a stop command.
pub fn op_move_camera(
    device: Arc<dyn DeviceRecord>,
    config: Arc<dyn SystemConfig>,
    pan: f32,
    tilt: f32,
    zoom: f32,
) -> Operation<PelcoDProperty> {
    let (p, t, z) = (
        map_float(pan, PAN_RANGE),
        map_float(tilt, TZ_RANGE),
        map_float(zoom, TZ_RANGE),
    );
    let prop = CommandProperty::new(p, t, z, 0, 0);
    let description = if prop.is_stop() {
        "stop".to_string()
    } else {
        format!("move pan {p} tilt {t} zoom {z}")
    };
    Operation::new("OpMoveCamera", PriorityLevel::Command, device, config, move || {
        Box::new(Move { prop, n_sent: 0 }) as Box<dyn Phase<PelcoDProperty>>
    })
    .with_description(description)
}

struct Move {
    prop: CommandProperty,
    n_sent: u32,
}

impl Phase<PelcoDProperty> for Move {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn poll(
        &mut self,
        _op: &Operation<PelcoDProperty>,
        mess: &mut CommMessage<'_, PelcoDProperty>,
    ) -> Result<Next<PelcoDProperty>> {
        mess.add(self.prop.into());
        mess.store_props()?;
        self.n_sent += 1;
        if self.prop.is_stop() && self.n_sent < STOP_SENDS {
            Ok(Next::Repeat)
        } else {
            Ok(Next::Done)
        }
    }
}
