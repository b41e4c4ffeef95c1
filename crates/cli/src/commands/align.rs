//! `align` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{FormatConfig, PipelineBlueprint};
use dispatcher::{write_file, AlignedFileWriter, AlignedSink, LogSink, WriteMode};
use ingestion::{EventParser, SensorFilter};
use sync_engine::StreamAligner;
use tracing::{debug, info, warn};

use crate::cli::AlignArgs;
use crate::config;
use crate::error::CliError;
use crate::pipeline::{discover_files, BatchRunner, BatchStats, FileStats, SkipReason};

/// Per-file parse, filter, align and write
pub struct AlignJob {
    parser: EventParser,
    filter: SensorFilter,
    aligner: StreamAligner,
    sink: Arc<dyn AlignedSink>,
    filtered: Option<FilteredTarget>,
}

/// Where filtered logs go
#[derive(Debug, Clone)]
pub struct FilteredTarget {
    pub dir: PathBuf,
    pub format: FormatConfig,
    pub mode: WriteMode,
}

impl AlignJob {
    pub fn new(location: &str, format: FormatConfig, sink: Arc<dyn AlignedSink>) -> Self {
        Self {
            parser: EventParser::new(format),
            filter: SensorFilter::for_location(location),
            aligner: StreamAligner::new(),
            sink,
            filtered: None,
        }
    }

    pub fn with_filtered_output(mut self, target: FilteredTarget) -> Self {
        self.filtered = Some(target);
        self
    }

    /// Process one raw log. Any failure becomes a skip reason for the batch.
    pub fn run(&self, path: &Path) -> std::result::Result<FileStats, SkipReason> {
        let log = self.parser.parse_path(path)?;
        let filtered = self.filter.apply(log)?;

        observability::record_rows(filtered.stats.records_parsed, filtered.stats.records_skipped);
        if filtered.overwritten > 0 {
            debug!(
                file = %path.display(),
                overwritten = filtered.overwritten,
                "Duplicate sample indices, later rows kept"
            );
        }

        let filtered_output = match &self.filtered {
            Some(_) if filtered.is_empty() => {
                info!(file = %path.display(), "No matching data found, filtered log not written");
                None
            }
            Some(target) => Some(write_filtered(path, &filtered.render(target.format), target)?),
            None => None,
        };

        let stats = filtered.stats;
        let aligned = self
            .aligner
            .align_log(filtered.header_lines, &filtered.streams)?;
        observability::record_records_aligned(aligned.records.len());

        let receipt = self.sink.write(path, &aligned)?;
        if let Some(ref written) = receipt.path {
            info!(
                file = %path.display(),
                output = %written.display(),
                records = receipt.records,
                "Aligned file written"
            );
        }

        Ok(FileStats {
            rows_parsed: stats.records_parsed,
            rows_skipped: stats.records_skipped,
            records_aligned: aligned.records.len() as u64,
            output: receipt.path,
            filtered_output,
        })
    }
}

fn write_filtered(
    source: &Path,
    rendered: &str,
    target: &FilteredTarget,
) -> std::result::Result<PathBuf, SkipReason> {
    let name = source
        .file_name()
        .ok_or_else(|| SkipReason::new(crate::pipeline::SkipKind::Other, "source has no file name"))?;
    let path = target.dir.join(name);
    write_file(&path, rendered.as_bytes(), target.mode)?;
    debug!(file = %source.display(), output = %path.display(), "Filtered log written");
    Ok(path)
}

/// Build the job for a resolved blueprint
pub fn build_job(blueprint: &PipelineBlueprint, args: &AlignArgs) -> Result<AlignJob> {
    let location = blueprint
        .location_label()
        .ok_or(CliError::MissingLocation)?;
    let format = blueprint.format;
    let mode = WriteMode::from_force(args.force);

    let sink: Arc<dyn AlignedSink> = if args.dry_run {
        Arc::new(LogSink::new("dry-run", format))
    } else {
        let dir = blueprint
            .dataset
            .output_dir
            .clone()
            .ok_or(CliError::MissingOutput)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Arc::new(AlignedFileWriter::new(dir, format, mode))
    };

    let mut job = AlignJob::new(location, format, sink);
    if let Some(ref dir) = args.filtered_output {
        if args.dry_run {
            warn!("--filtered-output is ignored in dry-run mode");
        } else {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create filtered output directory {}", dir.display())
            })?;
            job = job.with_filtered_output(FilteredTarget {
                dir: dir.clone(),
                format,
                mode,
            });
        }
    }
    Ok(job)
}

/// Execute the `align` command
pub async fn run_align(args: &AlignArgs) -> Result<BatchStats> {
    let mut blueprint = config::load_blueprint(args.source.config.as_deref())?;
    config::apply_source_overrides(&mut blueprint, &args.source);
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding output directory from CLI");
        blueprint.dataset.output_dir = Some(output.clone());
    }
    let blueprint = config::validated(blueprint)?;

    info!(
        input = %blueprint.dataset.input_dir.display(),
        output = ?blueprint.dataset.output_dir,
        location = blueprint.location_label().unwrap_or("-"),
        workers = blueprint.batch.workers,
        dry_run = args.dry_run,
        "Configuration loaded"
    );

    let job = build_job(&blueprint, args)?;
    let files = discover_files(&blueprint)?;
    let files_total = files.len();
    if files.is_empty() {
        warn!(dir = %blueprint.dataset.input_dir.display(), "No input files found");
    }

    let report = BatchRunner::from_blueprint(&blueprint)
        .run(files, move |path: &Path| job.run(path))
        .await?;
    let stats = BatchStats::from_report(files_total, &report);

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize batch stats")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SourceArgs;
    use crate::pipeline::SkipKind;

    const RAW: &str = "\
% Sensor_ID; Device_ID; Position; Model
% C4:BE:84:70:64:8A; 0; RIGHTPOCKET; SensorTag
% C4:BE:84:71:A5:02; 1; WAIST; SensorTag
% TimeStamp; Sample No; X-Axis; Y-Axis; Z-Axis; Sensor Type; Sensor ID
100;1;0.1;0.2;0.3;0;0
101;1;1.1;1.2;1.3;1;0
100;1;9;9;9;0;1
110;2;0.4;0.5;0.6;0;0
112;2;1.4;1.5;1.6;1;0
";

    fn args(input: &Path, output: &Path) -> AlignArgs {
        AlignArgs {
            source: SourceArgs {
                input: Some(input.to_path_buf()),
                location: Some("RIGHTPOCKET".to_string()),
                workers: Some(2),
                ..Default::default()
            },
            output: Some(output.to_path_buf()),
            filtered_output: None,
            force: false,
            dry_run: false,
            json: true,
        }
    }

    #[tokio::test]
    async fn test_align_writes_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("aligned");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("s01.csv"), RAW).unwrap();

        let stats = run_align(&args(&input, &output)).await.unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.records_aligned, 2);

        let aligned = std::fs::read_to_string(output.join("s01.csv")).unwrap();
        assert!(aligned.contains("100;1;0.1;0.2;0.3;1.1;1.2;1.3\n"));
        assert!(aligned.contains("110;2;0.4;0.5;0.6;1.4;1.5;1.6\n"));

        let again = run_align(&args(&input, &output)).await.unwrap();
        assert_eq!(again.written, 0);
        assert_eq!(again.skipped_total(), 1);

        let mut forced = args(&input, &output);
        forced.force = true;
        assert_eq!(run_align(&forced).await.unwrap().written, 1);
        assert_eq!(std::fs::read_to_string(output.join("s01.csv")).unwrap(), aligned);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("aligned");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("s01.csv"), RAW).unwrap();

        let mut dry = args(&input, &output);
        dry.dry_run = true;
        let stats = run_align(&dry).await.unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.written, 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_location_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut no_location = args(dir.path(), &dir.path().join("out"));
        no_location.source.location = None;
        let err = run_align(&no_location).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingLocation)
        ));
    }

    #[test]
    fn test_filtered_output_keeps_input_schema() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("s01.csv");
        std::fs::write(&source, RAW).unwrap();
        let filtered_dir = dir.path().join("filtered");
        std::fs::create_dir(&filtered_dir).unwrap();

        let job = AlignJob::new(
            "RIGHTPOCKET",
            FormatConfig::default(),
            Arc::new(LogSink::new("test", FormatConfig::default())),
        )
        .with_filtered_output(FilteredTarget {
            dir: filtered_dir.clone(),
            format: FormatConfig::default(),
            mode: WriteMode::CreateNew,
        });

        let stats = job.run(&source).unwrap();
        assert_eq!(stats.rows_parsed, 5);
        assert_eq!(stats.records_aligned, 2);
        assert!(stats.output.is_none());

        let filtered = std::fs::read_to_string(filtered_dir.join("s01.csv")).unwrap();
        assert!(filtered.starts_with("% Sensor_ID;"));
        assert!(!filtered.contains("100;1;9;9;9;0;1"));
        assert!(filtered.contains("112;2;1.4;1.5;1.6;1;0"));
    }

    #[tokio::test]
    async fn test_no_filtered_log_for_device_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("aligned");
        let filtered_dir = dir.path().join("filtered");
        std::fs::create_dir(&input).unwrap();
        // RIGHTPOCKET is id 0, every data row belongs to device 1
        let other_device: String = RAW
            .lines()
            .filter(|l| l.starts_with('%') || l.ends_with(";1"))
            .map(|l| format!("{l}\n"))
            .collect();
        std::fs::write(input.join("s02.csv"), &other_device).unwrap();

        let mut with_filtered = args(&input, &output);
        with_filtered.filtered_output = Some(filtered_dir.clone());
        let stats = run_align(&with_filtered).await.unwrap();
        assert_eq!(stats.written, 0);
        assert_eq!(stats.skipped.get(&SkipKind::NoAlignableData), Some(&1));
        assert!(!filtered_dir.join("s02.csv").exists());

        // A re-run still reports the data problem, not a leftover file
        let again = run_align(&with_filtered).await.unwrap();
        assert_eq!(again.skipped.get(&SkipKind::NoAlignableData), Some(&1));
        assert!(!filtered_dir.join("s02.csv").exists());
    }
}
