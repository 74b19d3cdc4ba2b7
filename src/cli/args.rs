use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Command line arguments for SerBridge
#[derive(Parser, Debug)]
#[command(
    name = "serbridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial device bridge with WebSocket broadcast",
    long_about = "Bridges a serial-attached measurement device to browser-hosted and desktop consumers: polls attached devices, manages a single serial connection, frames the byte stream into records, and fans records out over WebSocket."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the device bridge
    Run(RunArgs),
    /// List currently attached serial devices
    Devices,
    /// Configuration management commands
    Config(ConfigArgs),
}

/// Output format options
#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Bridge run arguments
#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// WebSocket listen port (overrides config)
    #[arg(short, long)]
    pub listen_port: Option<u16>,

    /// Baud rate (overrides config)
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Device poll interval in milliseconds (overrides config)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Auto-select the first device whose vendor tag contains this substring
    #[arg(long)]
    pub auto_vendor: Option<String>,

    /// Connect to this device id immediately on startup
    #[arg(short, long)]
    pub device: Option<String>,
}

/// Configuration arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init,
}
