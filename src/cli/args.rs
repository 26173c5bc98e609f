use crate::core::payload::PayloadFormat;
use crate::domain::config::{FlowControlConfig, ParityConfig};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for serlink
#[derive(Parser, Debug)]
#[command(
    name = "serlink",
    version = env!("CARGO_PKG_VERSION"),
    about = "Point-to-point serial command/response tool",
    long_about = "Open a serial device, write raw bytes, optionally wait for the response, and close the device again."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available serial ports
    Ports,
    /// Write bytes to a device and optionally wait for a response
    Send(SendArgs),
    /// Read whatever a device sends within the timeout
    Read(ReadArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Which device to open and how
#[derive(ClapArgs, Debug, Default)]
pub struct TargetArgs {
    /// Serial port path
    #[arg(short, long, conflicts_with = "device")]
    pub port: Option<String>,

    /// Device profile name from the configuration
    #[arg(short, long)]
    pub device: Option<String>,

    /// Baud rate [default: 9600, or the profile's rate]
    #[arg(short, long, allow_negative_numbers = true)]
    pub baud: Option<i64>,

    /// Data bits
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Stop bits
    #[arg(long)]
    pub stop_bits: Option<u8>,

    /// Parity (none, even, odd)
    #[arg(long, value_enum)]
    pub parity: Option<ParityArg>,

    /// Flow control (none, software, hardware)
    #[arg(long, value_enum)]
    pub flow_control: Option<FlowControlArg>,

    /// Read timeout in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

/// Arguments for `send`
#[derive(ClapArgs, Debug)]
pub struct SendArgs {
    /// Data to send
    pub data: String,

    /// Data format
    #[arg(short, long, value_enum, default_value = "bytes")]
    pub format: DataFormat,

    /// Wait for a response after writing
    #[arg(short, long)]
    pub wait: bool,

    /// Keep reading until this many response bytes arrived (implies --wait)
    #[arg(short, long)]
    pub expect: Option<usize>,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for `read`
#[derive(ClapArgs, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create a project configuration with an example device
    Init {
        /// Directory to create `.serlink/` in
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print the configuration file locations
    Path,
}

/// Parity configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ParityArg {
    None,
    Even,
    Odd,
}

/// Flow control configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FlowControlArg {
    None,
    Software,
    Hardware,
}

/// Payload format argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DataFormat {
    /// Raw UTF-8 text
    Text,
    /// Hex digits, e.g. "80 80 80 80 10"
    Hex,
    /// Base64
    Base64,
    /// Byte values, e.g. "128,128,128,128,0b00010000"
    Bytes,
}

impl From<ParityArg> for ParityConfig {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Self::None,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
        }
    }
}

impl From<FlowControlArg> for FlowControlConfig {
    fn from(flow_control: FlowControlArg) -> Self {
        match flow_control {
            FlowControlArg::None => Self::None,
            FlowControlArg::Software => Self::Software,
            FlowControlArg::Hardware => Self::Hardware,
        }
    }
}

impl From<DataFormat> for PayloadFormat {
    fn from(format: DataFormat) -> Self {
        match format {
            DataFormat::Text => Self::Text,
            DataFormat::Hex => Self::Hex,
            DataFormat::Base64 => Self::Base64,
            DataFormat::Bytes => Self::Bytes,
        }
    }
}
