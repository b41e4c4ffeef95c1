//! `census` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SensorType;
use ingestion::{EventParser, SensorFilter};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::CensusArgs;
use crate::config;
use crate::pipeline::{discover_files, BatchRunner};

/// Gyroscope sample counts over a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GyroCensus {
    /// Restricting location, `None` counts every device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub files_scanned: usize,
    pub files_with_gyro: usize,
    pub gyro_samples: u64,
    /// Unreadable files, or files that do not declare the location
    pub files_skipped: usize,
}

/// Execute the `census` command
pub async fn run_census(args: &CensusArgs) -> Result<GyroCensus> {
    let blueprint = config::resolve_source(&args.source)?;
    let location = blueprint.location_label().map(str::to_string);
    info!(
        input = %blueprint.dataset.input_dir.display(),
        location = location.as_deref().unwrap_or("(all devices)"),
        "Counting gyroscope samples"
    );

    let parser = EventParser::new(blueprint.format);
    let filter = match &location {
        Some(label) => SensorFilter::for_location(label.as_str()),
        None => SensorFilter::any_device(),
    };

    let files = discover_files(&blueprint)?;
    let report = BatchRunner::from_blueprint(&blueprint)
        .run(files, move |path: &Path| {
            let filtered = filter.apply(parser.parse_path(path)?)?;
            let gyro = filtered
                .retained
                .iter()
                .filter(|e| e.sensor_type == SensorType::Gyro)
                .count() as u64;
            if gyro > 0 {
                debug!(file = %path.display(), gyro, "Found gyroscope data");
            }
            Ok(gyro)
        })
        .await?;

    let mut census = GyroCensus {
        location,
        files_skipped: report.skipped(),
        ..Default::default()
    };
    for &gyro in report.done() {
        census.files_scanned += 1;
        census.gyro_samples += gyro;
        census.files_with_gyro += usize::from(gyro > 0);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&census).context("Failed to serialize census")?;
        println!("{}", json);
    } else {
        println!("Total Gyroscope Samples found: {}", census.gyro_samples);
        println!("Files containing Gyroscope data: {}", census.files_with_gyro);
    }

    Ok(census)
}
