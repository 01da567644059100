//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tsdb-relay - forward metric batches from Kafka to OpenTSDB
#[derive(Parser, Debug)]
#[command(
    name = "tsdb-relay",
    author,
    version,
    about = "Kafka to OpenTSDB relay with endpoint failover",
    long_about = "Consumes serialized metric batches from a message stream and forwards\n\
                  each one to OpenTSDB-compatible HTTP backends.\n\n\
                  Every route samples records by its discard ratio; every destination\n\
                  rotates round-robin over its endpoints and fails over on transport errors."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TSDB_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TSDB_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay
    Run(RunArgs),

    /// Validate configuration without running
    Validate(ValidateArgs),

    /// Display routes, ratios and endpoints
    Info(InfoArgs),
}

/// Where the relay configuration comes from
///
/// Without `--config` the configuration is built from environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "TSDB_RELAY_CONFIG", conflicts_with = "from_env")]
    pub config: Option<PathBuf>,

    /// Build the configuration from KAFKA_* and OPEN_TSDB_* variables
    #[arg(long)]
    pub from_env: bool,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "TSDB_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Stop after this many records (0 = unlimited)
    #[arg(long, default_value = "0", env = "TSDB_RELAY_MAX_RECORDS")]
    pub max_records: u64,

    /// Override the source poll timeout in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_timeout_ms: Option<u64>,

    /// Validate configuration and exit without consuming
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
