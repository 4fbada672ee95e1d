use std::sync::Arc;

use fieldpoll_message::CommMessage;
use fieldpoll_op::{DeviceRecord, Next, Operation, Phase, PriorityLevel, Result, SystemConfig};

use super::preset::PresetProperty;
use super::PelcoDProperty;

/// Build an operation to recall (or, with `store`, save) a camera preset.
pub fn op_preset(
    device: Arc<dyn DeviceRecord>,
    config: Arc<dyn SystemConfig>,
    store: bool,
    preset: u8,
) -> Operation<PelcoDProperty> {
    let prop = PresetProperty::new(store, preset);
    let verb = if store { "store" } else { "recall" };
    Operation::new("OpPreset", PriorityLevel::Command, device, config, move || {
        Box::new(CommandPreset { prop }) as Box<dyn Phase<PelcoDProperty>>
    })
    .with_description(format!("{verb} preset {preset}"))
}

struct CommandPreset {
    prop: PresetProperty,
}

impl Phase<PelcoDProperty> for CommandPreset {
    fn name(&self) -> &'static str {
        "CommandPreset"
    }

    fn poll(
        &mut self,
        _op: &Operation<PelcoDProperty>,
        mess: &mut CommMessage<'_, PelcoDProperty>,
    ) -> Result<Next<PelcoDProperty>> {
        mess.add(self.prop.into());
        mess.store_props()?;
        Ok(Next::Done)
    }
}
