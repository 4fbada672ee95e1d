use std::sync::Arc;

use fieldpoll_op::{EngineConfig, SystemConfig};
use fieldpoll_proto::{manchester, pelcod};

use crate::cmd::{CameraProtocol, PresetArgs};
use crate::exit::CliResult;
use crate::output::{print_report, OutputFormat};
use crate::sim;

pub fn run(args: PresetArgs, format: OutputFormat, config: &EngineConfig) -> CliResult<i32> {
    let device = args.device.device("CAM");
    let config: Arc<dyn SystemConfig> = Arc::new(*config);
    let link = sim::link(args.device.fail);

    let report = match args.protocol {
        CameraProtocol::Manchester => {
            let op = manchester::op_preset(device.clone(), config, args.store, args.preset);
            sim::run("manchester", &device, op, link)
        }
        CameraProtocol::Pelcod => {
            let op = pelcod::op_preset(device.clone(), config, args.store, args.preset);
            sim::run("pelcod", &device, op, link)
        }
    };

    print_report(&report, format);
    Ok(report.exit_code())
}
