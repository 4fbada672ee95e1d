use std::sync::Arc;

use fieldpoll_message::CommMessage;
use fieldpoll_op::{
    DeviceRecord, Next, Operation, Phase, PollError, PriorityLevel, Result, SystemConfig,
};
use tracing::debug;

use super::macro_select::MacroSelectProp;
use super::monitor::MonitorDirectory;
use super::{ErrorMsg, PelcoPProperty};

/// Build an operation that answers one macro selection from `keyboard`.
///
/// The request names a monitor and a macro; the monitor is found in
/// `monitors` and switched to that sequence. If either is unknown the
/// status sent back carries [`ErrorMsg::MacNotPresent`].
pub fn op_macro_select(
    keyboard: Arc<dyn DeviceRecord>,
    config: Arc<dyn SystemConfig>,
    monitors: Arc<dyn MonitorDirectory>,
    logged_in: bool,
) -> Operation<PelcoPProperty> {
    Operation::new("OpMacroSelect", PriorityLevel::Command, keyboard, config, move || {
        Box::new(SelectMacro {
            monitors,
            logged_in,
        }) as Box<dyn Phase<PelcoPProperty>>
    })
}

struct SelectMacro {
    monitors: Arc<dyn MonitorDirectory>,
    logged_in: bool,
}

impl Phase<PelcoPProperty> for SelectMacro {
    fn name(&self) -> &'static str {
        "SelectMacro"
    }

    fn poll(
        &mut self,
        _op: &Operation<PelcoPProperty>,
        mess: &mut CommMessage<'_, PelcoPProperty>,
    ) -> Result<Next<PelcoPProperty>> {
        mess.add(MacroSelectProp::new(self.logged_in).into());
        mess.query_props()?;

        let Some(PelcoPProperty::MacroSelect(prop)) = mess.props_mut().first_mut() else {
            return Err(PollError::fatal("macro select property missing"));
        };
        let (mon, mac) = (prop.mon_num(), prop.mac_num());
        let selected = self
            .monitors
            .find(mon)
            .is_some_and(|vm| vm.set_seq_num(mac));
        if selected {
            debug!(mon, mac, "macro selected");
        } else {
            debug!(mon, mac, "macro not present");
            prop.set_err(ErrorMsg::MacNotPresent);
        }

        mess.store_props()?;
        Ok(Next::Done)
    }
}
