//! sidelobe command-line interface.
//!
//! Over-the-air fuzzing for IEEE 802.15.4 stacks.
//!
//! # Quick Start
//!
//! ```bash
//! # What can be combined
//! sidelobe list
//!
//! # Fill sweep against a loopback target, results to a file
//! sidelobe run -I loopback -G preamble-fill -H received-frame \
//!     --constraint max_fill=4 -f results.json
//!
//! # Which cases were missed
//! sidelobe summarize results.json
//! ```

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sidelobe::{GeneratorError, HarnessError, LinkError};
use tracing_subscriber::EnvFilter;

/// Exit status for an unknown interface name.
const EXIT_UNKNOWN_INTERFACE: u8 = 10;
/// Exit status for an unknown generator name.
const EXIT_UNKNOWN_GENERATOR: u8 = 11;
/// Exit status for an unknown harness name.
const EXIT_UNKNOWN_HARNESS: u8 = 12;

/// sidelobe - over-the-air fuzzing for IEEE 802.15.4 stacks.
#[derive(Parser)]
#[command(name = "sidelobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Alternate control and test cases against a target.
    Run(RunArgs),

    /// List available interfaces, generators and harnesses.
    List,

    /// Summarize verdicts from result files or directories of them.
    Summarize {
        /// Result files or directories.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print summaries as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration.
    Config {
        /// Directory holding sidelobe.toml (default: current directory).
        #[arg(long)]
        project_dir: Option<PathBuf>,

        /// Output format (toml, json).
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Transmit interface.
    #[arg(short = 'I', long)]
    interface: String,

    /// Case generator.
    #[arg(short = 'G', long)]
    generator: String,

    /// Evidence harness.
    #[arg(short = 'H', long)]
    harness: String,

    /// Interface the harness observes (default: the transmit interface).
    #[arg(long)]
    rx_interface: Option<String>,

    /// 802.15.4 channel (11-26).
    #[arg(short, long)]
    channel: Option<u8>,

    /// Passes over the generator's test cases.
    #[arg(long)]
    iterations: Option<u32>,

    /// Write the result set here instead of stdout.
    #[arg(short = 'f', long)]
    results_file: Option<PathBuf>,

    /// Per-run generator constraint (repeatable), e.g. max_fill=4.
    #[arg(long = "constraint", value_name = "KEY=VALUE")]
    constraints: Vec<String>,

    /// Sequence number of the first case.
    #[arg(long, value_parser = parse_u8)]
    start_seq: Option<u8>,

    /// Destination PAN ID (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u16)]
    target_pan: Option<u16>,

    /// Destination short address (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u16)]
    target_addr: Option<u16>,

    /// Delay between transmit and validity check, in milliseconds.
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Give up after this many consecutive control misses.
    #[arg(long)]
    max_control_attempts: Option<u32>,

    /// Directory holding sidelobe.toml (default: current directory).
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

fn parse_radix(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}' is not a number: {e}"))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    u8::try_from(parse_radix(s)?).map_err(|_| format!("'{s}' does not fit in one byte"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    u16::try_from(parse_radix(s)?).map_err(|_| format!("'{s}' does not fit in two bytes"))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Selection failures get their own exit status so scripts can tell a typo
/// from a failed run.
fn exit_code(error: &anyhow::Error) -> u8 {
    for cause in error.chain() {
        if let Some(LinkError::Unknown { .. }) = cause.downcast_ref::<LinkError>() {
            return EXIT_UNKNOWN_INTERFACE;
        }
        if let Some(GeneratorError::Unknown { .. }) = cause.downcast_ref::<GeneratorError>() {
            return EXIT_UNKNOWN_GENERATOR;
        }
        if let Some(HarnessError::Unknown { .. }) = cause.downcast_ref::<HarnessError>() {
            return EXIT_UNKNOWN_HARNESS;
        }
    }
    1
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Run(args) => commands::run::run(&args),
        Commands::List => commands::list::run(),
        Commands::Summarize { paths, json } => commands::summarize::run(&paths, json),
        Commands::Config {
            project_dir,
            format,
        } => commands::config::show(project_dir.as_deref(), &format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color);
    init_logging(cli.verbose);

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            style::print_error(&format!("{e:#}"));
            ExitCode::from(exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn numbers_accept_hex() {
        assert_eq!(parse_u16("0xABCD"), Ok(0xABCD));
        assert_eq!(parse_u16("4660"), Ok(0x1234));
        assert_eq!(parse_u8("0xff"), Ok(0xFF));
        assert!(parse_u8("256").is_err());
        assert!(parse_u16("0xfffff").is_err());
        assert!(parse_u16("pan").is_err());
    }

    #[test]
    fn unknown_names_map_to_distinct_codes() {
        let link = Err::<(), _>(LinkError::Unknown {
            name: "hackrf".to_string(),
        })
        .context("Failed to create interface")
        .unwrap_err();
        assert_eq!(exit_code(&link), EXIT_UNKNOWN_INTERFACE);

        let generator = anyhow::Error::new(GeneratorError::Unknown {
            name: "bitflip".to_string(),
        });
        assert_eq!(exit_code(&generator), EXIT_UNKNOWN_GENERATOR);

        let harness = anyhow::Error::new(HarnessError::Unknown {
            name: "ack".to_string(),
        });
        assert_eq!(exit_code(&harness), EXIT_UNKNOWN_HARNESS);

        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 1);
    }
}
