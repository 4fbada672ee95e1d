use std::sync::Arc;

use bytes::BytesMut;
use fieldpoll_op::EngineConfig;
use fieldpoll_proto::pelcop::{self, MacroSelectProp, MemoryMonitor, MonitorSet};

use crate::cmd::MacroArgs;
use crate::exit::{poll_error, CliResult};
use crate::output::{print_report, OutputFormat};
use crate::sim;

pub fn run(args: MacroArgs, format: OutputFormat, config: &EngineConfig) -> CliResult<i32> {
    let keyboard = args.device.device("KBD");

    let mut monitors = MonitorSet::new();
    for &num in &args.monitors {
        monitors.insert(MemoryMonitor::new(num, args.sequences.iter().copied()));
    }
    let monitors = Arc::new(monitors);

    // What the keyboard sends once the link stops timing out.
    let mut request = BytesMut::new();
    MacroSelectProp::encode_request(args.monitor, args.mac, &mut request)
        .map_err(|err| poll_error("encode request", err))?;
    let mut link = sim::link(args.device.fail);
    link.push_response(request.freeze());

    let op = pelcop::op_macro_select(
        keyboard.clone(),
        Arc::new(*config),
        monitors.clone(),
        args.logged_in,
    );
    let mut report = sim::run("pelcop", &keyboard, op, link);
    report.sequence = monitors.get(args.monitor).and_then(|m| m.seq_num());

    print_report(&report, format);
    Ok(report.exit_code())
}
