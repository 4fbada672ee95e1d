use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use fieldpoll_op::{EngineConfig, MemoryDevice};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod macro_select;
pub mod move_camera;
pub mod preset;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recall or store a camera preset.
    Preset(PresetArgs),
    /// Start or stop continuous pan/tilt/zoom (Pelco-D).
    Move(MoveArgs),
    /// Answer a keyboard macro selection (Pelco-P).
    Macro(MacroArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: &EngineConfig) -> CliResult<i32> {
    match command {
        Command::Preset(args) => preset::run(args, format, config),
        Command::Move(args) => move_camera::run(args, format, config),
        Command::Macro(args) => macro_select::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CameraProtocol {
    Manchester,
    Pelcod,
}

/// The simulated device and link.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Drop address of the device.
    #[arg(long, default_value = "1")]
    pub drop: u16,
    /// Device name. Default: derived from the drop address.
    #[arg(long)]
    pub name: Option<String>,
    /// Timeouts the link returns before answering.
    #[arg(long, value_name = "N", default_value = "0")]
    pub fail: usize,
    /// Treat the device as already failed (no retries).
    #[arg(long)]
    pub device_failed: bool,
}

impl DeviceArgs {
    pub fn device(&self, prefix: &str) -> Arc<MemoryDevice> {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{prefix}_{:03}", self.drop));
        let device = MemoryDevice::new(name, self.drop);
        device.set_failed(self.device_failed);
        Arc::new(device)
    }
}

#[derive(Args, Debug)]
pub struct PresetArgs {
    /// Camera protocol.
    #[arg(long, value_enum, default_value = "pelcod")]
    pub protocol: CameraProtocol,
    /// Preset number.
    #[arg(long)]
    pub preset: u8,
    /// Store the current position instead of recalling.
    #[arg(long)]
    pub store: bool,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Pan speed, -1.0 (left) to 1.0 (right).
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub pan: f32,
    /// Tilt speed, -1.0 (down) to 1.0 (up).
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub tilt: f32,
    /// Zoom speed, -1.0 (wide) to 1.0 (tele).
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub zoom: f32,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug)]
pub struct MacroArgs {
    /// Monitor number the keyboard asks for.
    #[arg(long)]
    pub monitor: u32,
    /// Macro (sequence) number the keyboard asks for.
    #[arg(long = "macro", value_name = "MACRO")]
    pub mac: u32,
    /// Monitors that exist (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "1")]
    pub monitors: Vec<u32>,
    /// Sequences every monitor can run (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "1")]
    pub sequences: Vec<u32>,
    /// Report the keyboard as logged in.
    #[arg(long)]
    pub logged_in: bool,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(test)]
mod tests {
    use fieldpoll_op::DeviceRecord;

    use super::*;

    #[test]
    fn device_name_defaults_from_drop() {
        let args = DeviceArgs {
            drop: 7,
            name: None,
            fail: 0,
            device_failed: true,
        };
        let dev = args.device("CAM");
        assert_eq!(dev.name(), "CAM_007");
        assert_eq!(dev.drop_address(), 7);
        assert!(dev.is_failed());
    }
}
