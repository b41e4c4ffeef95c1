//! Batch orchestrator - runs one job per file on a bounded worker pool.
//!
//! Files are independent: each job parses, filters and aligns its own file
//! on a blocking worker. A failed file becomes `FileOutcome::Skipped` and the
//! batch moves on. Ctrl+C stops scheduling and aborts pending files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use dispatcher::DispatcherError;
use ingestion::IngestionError;
use serde::Serialize;
use sync_engine::SyncError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::CliError;

/// Why a file was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    LocationNotFound,
    NoAlignableData,
    AlreadyExists,
    Io,
    Other,
}

impl SkipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipKind::LocationNotFound => "location_not_found",
            SkipKind::NoAlignableData => "no_alignable_data",
            SkipKind::AlreadyExists => "already_exists",
            SkipKind::Io => "io",
            SkipKind::Other => "other",
        }
    }
}

/// A per-file failure, already rendered for the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub kind: SkipKind,
    pub message: String,
}

impl SkipReason {
    pub fn new(kind: SkipKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<IngestionError> for SkipReason {
    fn from(err: IngestionError) -> Self {
        let kind = match &err {
            IngestionError::LocationNotFound { .. } => SkipKind::LocationNotFound,
            IngestionError::Io { .. } | IngestionError::Csv { .. } => SkipKind::Io,
            _ => SkipKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<SyncError> for SkipReason {
    fn from(err: SyncError) -> Self {
        let kind = match &err {
            SyncError::NoAlignableData { .. } => SkipKind::NoAlignableData,
            _ => SkipKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<DispatcherError> for SkipReason {
    fn from(err: DispatcherError) -> Self {
        let kind = match &err {
            DispatcherError::AlreadyExists { .. } => SkipKind::AlreadyExists,
            DispatcherError::Io { .. } => SkipKind::Io,
            _ => SkipKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

/// Result of one file
#[derive(Debug, Clone)]
pub enum FileOutcome<T> {
    Done(T),
    Skipped { reason: SkipReason },
}

impl<T> FileOutcome<T> {
    pub fn done(&self) -> Option<&T> {
        match self {
            FileOutcome::Done(value) => Some(value),
            FileOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            FileOutcome::Done(_) => None,
            FileOutcome::Skipped { reason } => Some(reason),
        }
    }
}

/// Outcomes of a batch, in input order
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<(PathBuf, FileOutcome<T>)>,
    /// Set when Ctrl+C stopped the batch early
    pub interrupted: bool,
    pub duration: Duration,
}

impl<T> BatchReport<T> {
    pub fn done(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|(_, outcome)| outcome.done())
    }

    pub fn skipped_by_kind(&self) -> BTreeMap<SkipKind, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.outcomes.iter().filter_map(|(_, o)| o.skip_reason()) {
            *counts.entry(reason.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.skip_reason().is_some())
            .count()
    }
}

/// Runs a per-file job over a set of files
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    workers: usize,
}

impl BatchRunner {
    /// Worker count is clamped to at least one
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn from_blueprint(blueprint: &PipelineBlueprint) -> Self {
        Self::new(blueprint.batch.workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` once per file. Completion order is arbitrary; the report is
    /// sorted back into input order.
    pub async fn run<T, F>(&self, files: Vec<PathBuf>, job: F) -> Result<BatchReport<T>>
    where
        T: Send + 'static,
        F: Fn(&Path) -> std::result::Result<T, SkipReason> + Send + Sync + 'static,
    {
        let start = Instant::now();
        let total = files.len();
        let job = Arc::new(job);
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        info!(files = total, workers = self.workers, "Starting batch");

        for (index, path) in files.into_iter().enumerate() {
            let job = Arc::clone(&job);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        let worker_path = path.clone();
                        match tokio::task::spawn_blocking(move || job(&worker_path)).await {
                            Ok(Ok(value)) => FileOutcome::Done(value),
                            Ok(Err(reason)) => FileOutcome::Skipped { reason },
                            Err(e) => FileOutcome::Skipped {
                                reason: SkipReason::new(
                                    SkipKind::Other,
                                    format!("worker failed: {e}"),
                                ),
                            },
                        }
                    }
                    Err(_) => FileOutcome::Skipped {
                        reason: SkipReason::new(SkipKind::Other, "worker pool closed"),
                    },
                };
                (index, path, outcome)
            });
        }

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut outcomes = Vec::with_capacity(total);
        let mut interrupted = false;
        let mut listening = true;

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    let (index, path, outcome) = joined.context("Batch task failed")?;
                    log_outcome(&path, &outcome);
                    outcomes.push((index, path, outcome));
                }
                signal = &mut shutdown, if listening => {
                    if let Err(e) = signal {
                        warn!(error = %e, "Cannot listen for Ctrl+C");
                        listening = false;
                        continue;
                    }
                    warn!(
                        completed = outcomes.len(),
                        remaining = total - outcomes.len(),
                        "Received shutdown signal, aborting remaining files"
                    );
                    permits.close();
                    tasks.abort_all();
                    interrupted = true;
                    break;
                }
            }
        }

        outcomes.sort_by_key(|(index, _, _)| *index);
        let report = BatchReport {
            outcomes: outcomes
                .into_iter()
                .map(|(_, path, outcome)| (path, outcome))
                .collect(),
            interrupted,
            duration: start.elapsed(),
        };

        info!(
            files = report.outcomes.len(),
            skipped = report.skipped(),
            duration_secs = report.duration.as_secs_f64(),
            "Batch complete"
        );

        Ok(report)
    }
}

fn log_outcome<T>(path: &Path, outcome: &FileOutcome<T>) {
    match outcome {
        FileOutcome::Done(_) => {
            debug!(file = %path.display(), "File processed");
            observability::record_file_outcome("processed");
        }
        FileOutcome::Skipped { reason } => {
            warn!(file = %path.display(), reason = %reason, "Skipping file");
            observability::record_file_outcome(reason.kind.as_str());
        }
    }
}

/// Files in the input directory matching the dataset extension, sorted by name
pub fn discover_files(blueprint: &PipelineBlueprint) -> std::result::Result<Vec<PathBuf>, CliError> {
    let dir = &blueprint.dataset.input_dir;
    let entries = std::fs::read_dir(dir).map_err(|source| CliError::InputDir {
        path: dir.clone(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && blueprint.matches_extension(path))
        .collect();
    files.sort();

    debug!(dir = %dir.display(), files = files.len(), "Discovered input files");
    Ok(files)
}
