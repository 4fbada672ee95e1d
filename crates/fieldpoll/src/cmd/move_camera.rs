use std::sync::Arc;

use fieldpoll_op::EngineConfig;
use fieldpoll_proto::pelcod;

use crate::cmd::MoveArgs;
use crate::exit::CliResult;
use crate::output::{print_report, OutputFormat};
use crate::sim;

pub fn run(args: MoveArgs, format: OutputFormat, config: &EngineConfig) -> CliResult<i32> {
    let device = args.device.device("CAM");
    let op = pelcod::op_move_camera(
        device.clone(),
        Arc::new(*config),
        args.pan,
        args.tilt,
        args.zoom,
    );
    let report = sim::run("pelcod", &device, op, sim::link(args.device.fail));

    print_report(&report, format);
    Ok(report.exit_code())
}
