//! Batch conversion engine
//!
//! Drives every input file through read → parse → validate → extract →
//! render and assembles the results into one HTML document:
//! - **Listing / Sorting**: directory entries ordered newest first
//! - **Batching**: fixed-size groups, processed one group at a time
//! - **Per-file work**: blocking decode and parse on tokio's blocking pool,
//!   all files of a batch concurrently
//! - **Ordered collection**: each task writes to its own index slot, so
//!   completion order never changes fragment order
//!
//! A failure in one file becomes an error fragment. Only a directory that
//! cannot be listed (or is empty) and a failed final write abort the run,
//! and both leave a minimal error page at the output path.

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigManager};
use crate::document::parse_document;
use crate::error::{ReportError, Result};
use crate::extract::extract_report;
use crate::file_discovery::{FileDiscovery, SourceFile, sort_newest_first};
use crate::reader::FormatReader;
use crate::render::{
    ReportFragment, assemble_document, render_error, render_extracted, render_failure_document,
    render_no_reports,
};
use crate::schema::validate_document;
use crate::timestamp::TimestampNormalizer;

/// Converter settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub title: String,
    /// Files processed concurrently; batches run one after another
    pub batch_size: usize,
    pub streaming_threshold: u64,
    pub normalizer: TimestampNormalizer,
}

impl From<&Config> for ConverterConfig {
    fn from(config: &Config) -> Self {
        Self {
            input_dir: config.input.directory.clone(),
            output_path: config.output.path.clone(),
            title: config.output.title.clone(),
            batch_size: config.processing.batch_size.max(1),
            streaming_threshold: config.processing.streaming_threshold_bytes,
            normalizer: ConfigManager::timestamp_normalizer(config),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Phase of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Listing,
    Sorting,
    Batching,
    Processing,
    Assembling,
    Writing,
    Done,
    Failed,
}

/// Progress update for a run
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub phase: RunPhase,
    /// File that just finished, during `Processing`
    pub current_file: Option<PathBuf>,
    pub completed: usize,
    pub total: usize,
}

/// Progress callback type for run updates
pub type ProgressCallback = Arc<dyn Fn(RunProgress) + Send + Sync>;

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Rendered as a report section
    Rendered { records: usize },
    /// Rendered as an error section
    Failed { message: String },
    /// Not a report container; no section
    Skipped { reason: String },
}

impl FileStatus {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FileStatus::Rendered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileStatus::Skipped { .. })
    }
}

/// Result of processing one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub duration: Duration,
    pub fragment: Option<ReportFragment>,
}

impl FileOutcome {
    fn rendered(
        file: &SourceFile,
        records: usize,
        fragment: ReportFragment,
        duration: Duration,
    ) -> Self {
        Self {
            path: file.path.clone(),
            status: FileStatus::Rendered { records },
            duration,
            fragment: Some(fragment),
        }
    }

    fn failed(file: &SourceFile, error: &ReportError, duration: Duration) -> Self {
        let message = error.to_string();
        Self {
            fragment: Some(render_error(&file.display_name(), &message)),
            path: file.path.clone(),
            status: FileStatus::Failed { message },
            duration,
        }
    }

    fn skipped(file: &SourceFile, reason: String, duration: Duration) -> Self {
        Self {
            path: file.path.clone(),
            status: FileStatus::Skipped { reason },
            duration,
            fragment: None,
        }
    }
}

/// Aggregated outcome of a run
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub total_files: usize,
    pub rendered_files: usize,
    pub failed_files: usize,
    pub skipped_files: usize,
    pub total_records: usize,
    pub total_duration: Duration,
    /// Per-file outcomes in output order (fragments already consumed)
    pub file_results: Vec<FileOutcome>,
    pub output_path: PathBuf,
    /// Set when the run ended in the `Failed` phase
    pub run_error: Option<String>,
}

impl ConversionSummary {
    /// Aggregate individual file outcomes into a summary
    pub fn aggregate(file_results: Vec<FileOutcome>, output_path: PathBuf) -> Self {
        let mut rendered_files = 0;
        let mut failed_files = 0;
        let mut skipped_files = 0;
        let mut total_records = 0;
        let mut total_duration = Duration::ZERO;

        for result in &file_results {
            match result.status {
                FileStatus::Rendered { records } => {
                    rendered_files += 1;
                    total_records += records;
                }
                FileStatus::Failed { .. } => failed_files += 1,
                FileStatus::Skipped { .. } => skipped_files += 1,
            }
            total_duration += result.duration;
        }

        Self {
            total_files: file_results.len(),
            rendered_files,
            failed_files,
            skipped_files,
            total_records,
            total_duration,
            file_results,
            output_path,
            run_error: None,
        }
    }

    fn run_failed(output_path: PathBuf, error: &ReportError, duration: Duration) -> Self {
        let mut summary = Self::aggregate(Vec::new(), output_path);
        summary.total_duration = duration;
        summary.run_error = Some(error.to_string());
        summary
    }

    /// The run completed and wrote a regular report
    pub fn is_success(&self) -> bool {
        self.run_error.is_none()
    }
}

/// Batch converter from report directory to HTML document
pub struct ReportConverter {
    config: ConverterConfig,
    reader: FormatReader,
    discovery: FileDiscovery,
}

impl ReportConverter {
    pub fn new(config: ConverterConfig) -> Self {
        let reader = FormatReader::new(config.streaming_threshold);
        Self {
            config,
            reader,
            discovery: FileDiscovery::new(),
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Run the whole conversion
    pub async fn run(&self) -> ConversionSummary {
        self.run_with_progress(None).await
    }

    /// Run the whole conversion with progress tracking.
    ///
    /// Never returns an error: run-level failures are written to the
    /// output path as an error page and reported in the summary.
    pub async fn run_with_progress(
        &self,
        progress_callback: Option<ProgressCallback>,
    ) -> ConversionSummary {
        let start = Instant::now();
        let notify = |phase: RunPhase, completed: usize, total: usize| {
            if let Some(ref callback) = progress_callback {
                callback(RunProgress {
                    phase,
                    current_file: None,
                    completed,
                    total,
                });
            }
        };

        // Listing
        notify(RunPhase::Listing, 0, 0);
        let mut files = match self.discovery.discover_files(&self.config.input_dir).await {
            Ok(files) => files,
            Err(e) => {
                notify(RunPhase::Failed, 0, 0);
                return self.fail_run(e, start).await;
            }
        };
        info!(
            "Found {} entries in {}",
            files.len(),
            self.config.input_dir.display()
        );

        // Sorting
        notify(RunPhase::Sorting, 0, files.len());
        sort_newest_first(&mut files);

        // Batching + processing
        notify(RunPhase::Batching, 0, files.len());
        let mut outcomes = self
            .process_files(files, progress_callback.clone())
            .await;

        // Assembling
        notify(RunPhase::Assembling, outcomes.len(), outcomes.len());
        let mut fragments: Vec<ReportFragment> = outcomes
            .iter_mut()
            .filter_map(|outcome| outcome.fragment.take())
            .collect();
        if fragments.is_empty() {
            warn!("No report files found in {}", self.config.input_dir.display());
            fragments.push(render_no_reports());
        }
        let document = assemble_document(&self.config.title, &fragments);

        // Writing
        notify(RunPhase::Writing, outcomes.len(), outcomes.len());
        if let Err(e) = tokio::fs::write(&self.config.output_path, document).await {
            let err = ReportError::Write {
                path: self.config.output_path.clone(),
                source: e,
            };
            notify(RunPhase::Failed, outcomes.len(), outcomes.len());
            return self.fail_run(err, start).await;
        }

        let mut summary = ConversionSummary::aggregate(outcomes, self.config.output_path.clone());
        summary.total_duration = start.elapsed();
        info!(
            "Wrote {} ({} rendered, {} failed, {} skipped)",
            self.config.output_path.display(),
            summary.rendered_files,
            summary.failed_files,
            summary.skipped_files
        );
        notify(RunPhase::Done, summary.total_files, summary.total_files);
        summary
    }

    /// Process files in order, `batch_size` at a time.
    ///
    /// The returned outcomes are in the same order as `files`.
    pub async fn process_files(
        &self,
        files: Vec<SourceFile>,
        progress_callback: Option<ProgressCallback>,
    ) -> Vec<FileOutcome> {
        let total = files.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let mut slots: Vec<Option<FileOutcome>> = vec![None; total];
        let batch_size = self.config.batch_size.max(1);

        for (batch_index, batch) in files.chunks(batch_size).enumerate() {
            let base = batch_index * batch_size;
            debug!(
                "Processing batch {} ({} files)",
                batch_index + 1,
                batch.len()
            );

            let tasks: Vec<_> = batch
                .iter()
                .cloned()
                .map(|file| {
                    let reader = self.reader;
                    let normalizer = self.config.normalizer;
                    let completed = Arc::clone(&completed);
                    let progress_callback = progress_callback.clone();

                    tokio::task::spawn_blocking(move || {
                        let outcome = Self::process_file(&reader, &normalizer, &file);

                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(ref callback) = progress_callback {
                            callback(RunProgress {
                                phase: RunPhase::Processing,
                                current_file: Some(file.path.clone()),
                                completed: done,
                                total,
                            });
                        }
                        outcome
                    })
                })
                .collect();

            let results = join_all(tasks).await;
            for (offset, (result, file)) in results.into_iter().zip(batch).enumerate() {
                let outcome = result.unwrap_or_else(|e| {
                    let err = ReportError::Concurrency {
                        details: format!("Task join error: {}", e),
                    };
                    error!("Failed to process {}: {}", file.path.display(), err);
                    FileOutcome::failed(file, &err, Duration::ZERO)
                });
                slots[base + offset] = Some(outcome);
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Run one file through the pipeline; failures become error outcomes
    pub fn process_file(
        reader: &FormatReader,
        normalizer: &TimestampNormalizer,
        file: &SourceFile,
    ) -> FileOutcome {
        let start = Instant::now();

        match Self::render_file(reader, normalizer, file) {
            Ok((fragment, records)) => {
                debug!("Rendered {} ({} records)", file.path.display(), records);
                FileOutcome::rendered(file, records, fragment, start.elapsed())
            }
            Err(ReportError::UnsupportedFormat { .. }) => {
                warn!("Skipping unsupported file: {}", file.path.display());
                FileOutcome::skipped(file, "unsupported file type".to_string(), start.elapsed())
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.path.display(), e);
                FileOutcome::failed(file, &e, start.elapsed())
            }
        }
    }

    fn render_file(
        reader: &FormatReader,
        normalizer: &TimestampNormalizer,
        file: &SourceFile,
    ) -> Result<(ReportFragment, usize)> {
        let text = reader.read_with(&file.path, file.kind, file.size)?;
        let document = parse_document(&text)?;
        validate_document(&document).into_result()?;
        let report = extract_report(&document, normalizer);
        Ok((render_extracted(&report), report.records.len()))
    }

    async fn fail_run(&self, err: ReportError, start: Instant) -> ConversionSummary {
        error!("Report generation failed: {}", err);

        let page = render_failure_document(&self.config.title, &err.to_string());
        if let Err(e) = tokio::fs::write(&self.config.output_path, page).await {
            error!(
                "Could not write error page to {}: {}",
                self.config.output_path.display(),
                e
            );
        }

        ConversionSummary::run_failed(self.config.output_path.clone(), &err, start.elapsed())
    }
}
