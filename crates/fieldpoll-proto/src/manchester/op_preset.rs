use std::sync::Arc;

use fieldpoll_message::CommMessage;
use fieldpoll_op::{DeviceRecord, Next, Operation, Phase, PriorityLevel, Result, SystemConfig};

use super::property::{ManchesterProperty, PresetProperty};

/// Build an operation to recall (or, with `store`, save) a camera preset.
pub fn op_preset(
    device: Arc<dyn DeviceRecord>,
    config: Arc<dyn SystemConfig>,
    store: bool,
    preset: u8,
) -> Operation<ManchesterProperty> {
    let prop = PresetProperty::new(store, preset);
    let verb = if store { "store" } else { "recall" };
    Operation::new("OpPreset", PriorityLevel::Command, device, config, move || {
        Box::new(CommandPreset { prop }) as Box<dyn Phase<ManchesterProperty>>
    })
    .with_description(format!("{verb} preset {preset}"))
}

struct CommandPreset {
    prop: PresetProperty,
}

impl Phase<ManchesterProperty> for CommandPreset {
    fn name(&self) -> &'static str {
        "CommandPreset"
    }

    fn poll(
        &mut self,
        _op: &Operation<ManchesterProperty>,
        mess: &mut CommMessage<'_, ManchesterProperty>,
    ) -> Result<Next<ManchesterProperty>> {
        mess.add(self.prop.into());
        mess.store_props()?;
        Ok(Next::Done)
    }
}
