//! Command-line frontend: one measurement per invocation.
//!
//! Output on stdout is the contract consumed by the discovery script:
//! `test` prints `Ok!`, the other modes print the bare decoded value,
//! and any failure prints a single line and exits nonzero. Diagnostics
//! go to stderr under `RUST_LOG` control.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use powermon::{Device, SensorKind, SerialConfig};

#[derive(Parser)]
#[command(name = "powermon")]
#[command(about = "Read a measurement from a serial power-monitoring device")]
struct Cli {
    /// Serial device path (e.g., /dev/ttyUSB0)
    device: String,

    /// Measurement to request
    #[arg(value_enum)]
    mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Probe the device without reading a value.
    Test,
    /// Line voltage in volts.
    Voltage,
    /// Load current in amperes.
    Current,
    /// Active power in watts.
    Power,
    /// Accumulated energy in watt-hours.
    Energy,
}

impl From<Mode> for SensorKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Test => Self::Test,
            Mode::Voltage => Self::Voltage,
            Mode::Current => Self::Current,
            Mode::Power => Self::Power,
            Mode::Energy => Self::Energy,
        }
    }
}

async fn run(cli: &Cli) -> powermon::Result<()> {
    let mut device = Device::open(&SerialConfig::new(&cli.device))?;
    let value = device.transact(cli.mode.into()).await?;

    if cli.mode == Mode::Test {
        println!("Ok!");
    } else {
        println!("{value}");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage and argument errors go to stdout for the calling script.
            println!("{e}");
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
