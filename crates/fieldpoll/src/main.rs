mod cmd;
mod config;
mod exit;
mod logging;
mod output;
mod sim;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fieldpoll", version, about = "Field device polling CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Engine configuration file (JSON).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Comm errors tolerated per operation before it fails.
    #[arg(
        long,
        value_name = "N",
        global = true,
        env = "FIELDPOLL_RETRY_THRESHOLD"
    )]
    retry_threshold: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = config::load(cli.config.as_deref(), cli.retry_threshold)
        .and_then(|config| cmd::run(cli.command, format, &config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::CameraProtocol;

    #[test]
    fn parses_preset_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldpoll",
            "preset",
            "--protocol",
            "manchester",
            "--preset",
            "5",
            "--store",
            "--drop",
            "12",
        ])
        .expect("preset args should parse");

        let Command::Preset(args) = cli.command else {
            panic!("expected preset");
        };
        assert_eq!(args.protocol, CameraProtocol::Manchester);
        assert_eq!(args.preset, 5);
        assert!(args.store);
        assert_eq!(args.device.drop, 12);
    }

    #[test]
    fn move_accepts_negative_speeds() {
        let cli = Cli::try_parse_from(["fieldpoll", "move", "--pan", "-0.5", "--tilt", "-1"])
            .expect("move args should parse");
        let Command::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert_eq!(args.pan, -0.5);
        assert_eq!(args.tilt, -1.0);
        assert_eq!(args.zoom, 0.0);
    }

    #[test]
    fn parses_macro_lists() {
        let cli = Cli::try_parse_from([
            "fieldpoll",
            "macro",
            "--monitor",
            "12",
            "--macro",
            "34",
            "--monitors",
            "12,13",
            "--sequences",
            "34,35",
        ])
        .expect("macro args should parse");
        let Command::Macro(args) = cli.command else {
            panic!("expected macro");
        };
        assert_eq!(args.monitors, vec![12, 13]);
        assert_eq!(args.sequences, vec![34, 35]);
        assert_eq!(args.mac, 34);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldpoll",
            "preset",
            "--preset",
            "1",
            "--retry-threshold",
            "0",
            "--format",
            "json",
        ])
        .expect("global flags should parse");
        assert_eq!(cli.retry_threshold, Some(0));
    }

    #[test]
    fn rejects_unknown_protocol() {
        let err = Cli::try_parse_from(["fieldpoll", "preset", "--protocol", "visca", "--preset", "1"])
            .expect_err("unknown protocol should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn preset_number_is_required() {
        let err = Cli::try_parse_from(["fieldpoll", "preset"]).expect_err("missing preset should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
