//! PipelineBlueprint - output of config_loader
//!
//! The complete batch configuration: dataset directories, log format, target
//! body location, windowing policy and worker count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{CHANNEL_COUNT, DEFAULT_WINDOW_LENGTH};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete batch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Dataset locations
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Log file format
    #[serde(default)]
    pub format: FormatConfig,

    /// Target body location
    #[serde(default)]
    pub location: LocationConfig,

    /// Windowing policy
    #[serde(default)]
    pub windowing: WindowingConfig,

    /// Batch concurrency
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Dataset directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Raw log directory
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Aligned output directory (required by `align`)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Log file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: None,
            extension: default_extension(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "csv".to_string()
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Prefix of comment (header) lines
    #[serde(default = "default_comment_marker")]
    pub comment_marker: char,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            comment_marker: default_comment_marker(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_comment_marker() -> char {
    '%'
}

fn default_delimiter() -> char {
    ';'
}

/// Target body location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Location label as declared in the header (e.g. "RIGHTPOCKET"), case-sensitive
    #[serde(default)]
    pub label: Option<String>,
}

/// Windowing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowingConfig {
    /// Window length L, in samples
    #[serde(default = "default_window_length")]
    pub window_length: usize,

    /// Channel count (6 for a single device)
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Label -> stride; TOML keys are strings
    #[serde(default = "default_strides")]
    pub strides: BTreeMap<String, i64>,

    /// Label column of a headered CSV input
    #[serde(default = "default_label_column")]
    pub label_column: String,

    /// Channel columns, in tensor channel order
    #[serde(default = "default_channel_columns")]
    pub channel_columns: Vec<String>,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            window_length: default_window_length(),
            channels: default_channels(),
            strides: default_strides(),
            label_column: default_label_column(),
            channel_columns: default_channel_columns(),
        }
    }
}

fn default_window_length() -> usize {
    DEFAULT_WINDOW_LENGTH
}

fn default_channels() -> usize {
    CHANNEL_COUNT
}

fn default_strides() -> BTreeMap<String, i64> {
    // Non-fall windows don't overlap, fall windows overlap by half
    BTreeMap::from([("0".to_string(), 200), ("1".to_string(), 100)])
}

fn default_label_column() -> String {
    "activity".to_string()
}

fn default_channel_columns() -> Vec<String> {
    [
        "rp_acc_x",
        "rp_acc_y",
        "rp_acc_z",
        "rp_gyro_x",
        "rp_gyro_y",
        "rp_gyro_z",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Batch settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Parallel workers, >= 1
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    4
}

impl PipelineBlueprint {
    /// Requested location label
    pub fn location_label(&self) -> Option<&str> {
        self.location.label.as_deref()
    }

    /// Output path for an input file (same file name)
    pub fn output_path_for(&self, input: &Path) -> Option<PathBuf> {
        let dir = self.dataset.output_dir.as_ref()?;
        input.file_name().map(|name| dir.join(name))
    }

    /// Whether a file has the dataset extension (case-insensitive)
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.dataset.extension))
    }
}
