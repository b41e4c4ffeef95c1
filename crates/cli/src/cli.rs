//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::CliError;

/// fallprep - fall-detection sensor log preparation
#[derive(Parser, Debug)]
#[command(
    name = "fallprep",
    author,
    version,
    about = "Fall-detection sensor log preparation pipeline",
    long_about = "Prepares wearable accelerometer/gyroscope logs for fall-detection models.\n\n\
                  Parses raw sensor logs, keeps the device worn at one body location, \n\
                  aligns accelerometer and gyroscope samples, audits clock sync and \n\
                  cuts labeled series into fixed-length training windows."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FALLPREP_VERBOSE")]
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
        env = "FALLPREP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus exporter port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "FALLPREP_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter raw logs to one body location and write aligned files
    Align(AlignArgs),

    /// Audit accelerometer/gyroscope timestamp divergence across a corpus
    CheckSync(CheckSyncArgs),

    /// Count gyroscope samples across a corpus
    Census(CensusArgs),

    /// Cut a labeled series into fixed-length training windows
    Window(WindowArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Corpus selection shared by the batch commands
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "FALLPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the raw log directory
    #[arg(short, long, env = "FALLPREP_INPUT")]
    pub input: Option<PathBuf>,

    /// Override the body-location label (e.g. RIGHTPOCKET)
    #[arg(short, long, env = "FALLPREP_LOCATION")]
    pub location: Option<String>,

    /// Override the number of parallel workers
    #[arg(short, long, env = "FALLPREP_WORKERS")]
    pub workers: Option<usize>,

    /// Override the log file extension (without the dot)
    #[arg(long, env = "FALLPREP_EXTENSION")]
    pub extension: Option<String>,
}

/// Arguments for the `align` command
#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Override the aligned output directory
    #[arg(short, long, env = "FALLPREP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also write the filtered, unaligned logs into this directory
    #[arg(long, env = "FALLPREP_FILTERED_OUTPUT")]
    pub filtered_output: Option<PathBuf>,

    /// Replace existing output files instead of skipping them
    #[arg(long)]
    pub force: bool,

    /// Parse, filter and align without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check-sync` command
#[derive(Args, Debug, Clone)]
pub struct CheckSyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `census` command
#[derive(Args, Debug, Clone)]
pub struct CensusArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `window` command
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "FALLPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Labeled CSV, or an aligned file when --label is given
    #[arg(short, long)]
    pub input: PathBuf,

    /// Tensor document to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Treat the input as an aligned file carrying this label for every row
    #[arg(long)]
    pub label: Option<u8>,

    /// Override the window length
    #[arg(long)]
    pub window_length: Option<usize>,

    /// Override a per-label stride, as LABEL=STRIDE (repeatable)
    #[arg(long = "stride", value_parser = parse_stride)]
    pub strides: Vec<StrideOverride>,

    /// Replace an existing tensor document
    #[arg(long)]
    pub force: bool,
}

/// A `--stride LABEL=STRIDE` override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideOverride {
    pub label: String,
    pub stride: i64,
}

/// Parse `LABEL=STRIDE`. The stride sign is checked later by the windower.
pub fn parse_stride(raw: &str) -> Result<StrideOverride, CliError> {
    let (label, stride) = raw
        .split_once('=')
        .ok_or_else(|| CliError::invalid_override("stride", raw))?;
    let label = label.trim();
    let stride = stride
        .trim()
        .parse::<i64>()
        .map_err(|_| CliError::invalid_override("stride", raw))?;
    if label.is_empty() {
        return Err(CliError::invalid_override("stride", raw));
    }
    Ok(StrideOverride {
        label: label.to_string(),
        stride,
    })
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "fallprep.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "fallprep.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-label stride details
    #[arg(long)]
    pub strides: bool,
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
