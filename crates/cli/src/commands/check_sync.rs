//! `check-sync` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use ingestion::{EventParser, SensorFilter};
use serde::Serialize;
use sync_engine::{SyncQualityChecker, SyncReport};
use tracing::info;

use crate::cli::CheckSyncArgs;
use crate::config;
use crate::pipeline::{discover_files, BatchRunner};

/// Report plus the files that could not be read or resolved
#[derive(Debug, Serialize)]
pub struct SyncAudit {
    #[serde(flatten)]
    pub report: SyncReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub files_skipped: usize,
}

/// Execute the `check-sync` command
pub async fn run_check_sync(args: &CheckSyncArgs) -> Result<SyncAudit> {
    let blueprint = config::resolve_source(&args.source)?;
    let location = blueprint.location_label().map(str::to_string);
    info!(
        input = %blueprint.dataset.input_dir.display(),
        location = location.as_deref().unwrap_or("(all devices)"),
        "Auditing accelerometer/gyroscope sync"
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
            let mut checker = SyncQualityChecker::new();
            checker.check(&filtered.streams);
            Ok(checker)
        })
        .await?;

    let mut total = SyncQualityChecker::new();
    for checker in report.done() {
        total.merge(checker);
    }

    let audit = SyncAudit {
        report: total.report(),
        location,
        files_skipped: report.skipped(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&audit).context("Failed to serialize sync report")?;
        println!("{}", json);
    } else {
        print!("{}", audit.report);
        if audit.files_skipped > 0 {
            println!("Skipped {} unreadable or unresolved files.", audit.files_skipped);
        }
    }

    Ok(audit)
}
