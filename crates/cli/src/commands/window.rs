//! `window` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use contracts::{ActivityLabel, LabeledSeries};
use dispatcher::{WindowTensor, WriteMode};
use ingestion::{load_labeled_csv, read_aligned, LabeledColumns};
use sync_engine::Windower;
use tracing::{info, warn};

use crate::cli::WindowArgs;
use crate::config;
use crate::error::CliError;

/// What the command wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSummary {
    pub samples: usize,
    pub windows: usize,
    pub label_counts: BTreeMap<ActivityLabel, usize>,
    pub bytes: usize,
}

/// Execute the `window` command
pub fn run_window(args: &WindowArgs) -> Result<WindowSummary> {
    let mut blueprint = config::load_blueprint(args.config.as_deref())?;
    config::apply_window_overrides(&mut blueprint, args.window_length, &args.strides);

    // Stride problems surface as windowing errors before general validation
    let windower = Windower::from_config(&blueprint.windowing).context("Invalid windowing configuration")?;
    let blueprint = config::validated(blueprint)?;

    let series = load_series(args, &blueprint)?;
    info!(
        input = %args.input.display(),
        samples = series.len(),
        window_length = windower.window_length(),
        "Loaded labeled series"
    );

    let batch = windower
        .windows(&series)
        .with_context(|| format!("Failed to window {}", args.input.display()))?;
    if batch.is_empty() {
        warn!(
            samples = series.len(),
            window_length = windower.window_length(),
            "No label sub-series is long enough for a single window"
        );
    }

    let tensor = WindowTensor::from_batch(&batch, Utc::now())
        .with_context(|| format!("Nothing to export from {}", args.input.display()))?;
    let bytes = tensor
        .write_to(&args.output, WriteMode::from_force(args.force))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let summary = WindowSummary {
        samples: series.len(),
        windows: batch.len(),
        label_counts: tensor.label_counts,
        bytes,
    };
    println!(
        "Wrote {} windows of shape [{}, {}] to {}",
        summary.windows,
        tensor.shape[1],
        tensor.shape[2],
        args.output.display()
    );
    for (label, count) in &summary.label_counts {
        println!("   label {}: {}", label, count);
    }
    Ok(summary)
}

fn load_series(args: &WindowArgs, blueprint: &contracts::PipelineBlueprint) -> Result<LabeledSeries> {
    match args.label {
        Some(label) => {
            let (log, stats) = read_aligned(&args.input, blueprint.format)?;
            if stats.records_skipped > 0 {
                warn!(
                    input = %args.input.display(),
                    skipped = stats.records_skipped,
                    "Skipped malformed aligned rows"
                );
            }
            Ok(LabeledSeries::uniform(log.records, label))
        }
        None => {
            let columns = LabeledColumns::from_config(&blueprint.windowing).ok_or_else(|| {
                CliError::config_validation("windowing.channel_columns must name exactly 6 columns")
            })?;
            Ok(load_labeled_csv(&args.input, &columns)?)
        }
    }
}
