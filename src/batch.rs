//! Sequential batch processing over a directory of images

use crate::classifier::BackgroundClassifier;
use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use crate::services::{
    BatchProcessingStats, ImageIOService, NoOpProgressReporter, ProcessingStage, ProgressReporter,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

/// What a batch run ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The input directory held no supported images
    NoMatchingFiles,
    /// At least one image was found; see the summary for details
    Completed(BatchSummary),
}

/// Counts and failures of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Images discovered
    pub found: usize,
    /// Images written successfully
    pub processed: usize,
    /// Input path and error message per failed image
    pub failures: Vec<(PathBuf, String)>,
    /// The run stopped early because the cancel flag was raised
    pub cancelled: bool,
}

impl BatchSummary {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Processes every supported image of a directory, one at a time
///
/// A failure on one image is recorded and the loop moves on.
pub struct BatchProcessor {
    classifier: BackgroundClassifier,
    recursive: bool,
    cancel: Arc<AtomicBool>,
    reporter: Box<dyn ProgressReporter>,
}

impl BatchProcessor {
    /// # Errors
    /// * `InvalidConfig` - see [`RemovalConfig::validate`]
    pub fn new(config: RemovalConfig) -> Result<Self> {
        Ok(Self {
            classifier: BackgroundClassifier::new(config)?,
            recursive: false,
            cancel: Arc::new(AtomicBool::new(false)),
            reporter: Box::new(NoOpProgressReporter),
        })
    }

    /// Descend into subdirectories during discovery
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Flag checked between images; setting it stops the run
    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    #[must_use]
    pub fn reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Supported image files under `input_dir`, sorted by path
    ///
    /// # Errors
    /// * `NotFound` - `input_dir` does not exist
    /// * `NotAFile` - `input_dir` is not a directory
    /// * `Io` - the directory could not be listed
    pub fn discover<P: AsRef<Path>>(&self, input_dir: P) -> Result<Vec<PathBuf>> {
        let input_dir = input_dir.as_ref();
        if !input_dir.exists() {
            return Err(BgRemovalError::not_found(input_dir));
        }
        if !input_dir.is_dir() {
            return Err(BgRemovalError::not_a_directory(input_dir));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir).min_depth(1).max_depth(max_depth) {
            let entry = entry.map_err(|e| {
                let message = e.to_string();
                BgRemovalError::from(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other(message)),
                )
            })?;
            if entry.file_type().is_file() && ImageIOService::is_supported_format(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Process every discovered image, writing `<stem>_no_bg.png` files
    ///
    /// Outputs go to `output_dir`, or next to each input when it is `None`.
    /// Subdirectories of a recursive run are mirrored under `output_dir`. An
    /// image whose output was already written earlier in the run is recorded
    /// as a failure instead of overwriting it.
    ///
    /// # Errors
    /// Only errors that prevent the whole batch: see [`Self::discover`], plus
    /// `Io` when the output directory cannot be created.
    #[instrument(skip(self, input_dir, output_dir), fields(input = %input_dir.as_ref().display()))]
    pub fn run<P: AsRef<Path>>(&self, input_dir: P, output_dir: Option<&Path>) -> Result<BatchOutcome> {
        let input_dir = input_dir.as_ref();
        let files = self.discover(input_dir)?;
        if files.is_empty() {
            info!("No supported images in {}", input_dir.display());
            return Ok(BatchOutcome::NoMatchingFiles);
        }

        if let Some(dir) = output_dir {
            std::fs::create_dir_all(dir)?;
        }

        self.reporter.report_batch_started(files.len());
        let mut summary = BatchSummary {
            found: files.len(),
            ..BatchSummary::default()
        };
        let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

        for input in &files {
            if self.cancel.load(Ordering::SeqCst) {
                warn!(
                    "Cancelled after {} of {} image(s)",
                    summary.processed,
                    files.len()
                );
                summary.cancelled = true;
                break;
            }

            self.reporter.report_batch_progress(&BatchProcessingStats {
                items_completed: summary.processed,
                items_total: files.len(),
                items_failed: summary.failed(),
                current_item_name: file_name(input),
            });

            let output = output_path(input, input_dir, output_dir);
            if let Some(first) = written.get(&output) {
                let e = BgRemovalError::encode(
                    &output,
                    format!("already written from {} in this batch", first.display()),
                );
                warn!("Skipping {}: {}", input.display(), e);
                self.reporter.report_error(
                    ProcessingStage::FileSaving,
                    &format!("{}: {}", file_name(input), e),
                );
                summary.failures.push((input.clone(), e.to_string()));
                continue;
            }

            match self.classifier.process_file_to(input, &output) {
                Ok(result) => {
                    summary.processed += 1;
                    self.reporter.report_completion(input, &result.timings);
                    written.insert(output, input.clone());
                },
                Err(e) => {
                    let stage = match e {
                        BgRemovalError::Encode { .. } => ProcessingStage::FileSaving,
                        _ => ProcessingStage::ImageLoading,
                    };
                    warn!("Failed to process {}: {}", input.display(), e);
                    self.reporter
                        .report_error(stage, &format!("{}: {}", file_name(input), e));
                    summary.failures.push((input.clone(), e.to_string()));
                },
            }
        }

        self.reporter.report_batch_finished(&BatchProcessingStats {
            items_completed: summary.processed,
            items_total: files.len(),
            items_failed: summary.failed(),
            current_item_name: String::new(),
        });

        Ok(BatchOutcome::Completed(summary))
    }
}

/// Target of `input`, keeping its subdirectory relative to `input_dir`
fn output_path(input: &Path, input_dir: &Path, output_dir: Option<&Path>) -> PathBuf {
    let Some(output_dir) = output_dir else {
        return ImageIOService::default_output_path(input);
    };
    let relative = input
        .parent()
        .and_then(|parent| parent.strip_prefix(input_dir).ok())
        .unwrap_or(Path::new(""));
    ImageIOService::output_path_in_dir(input, output_dir.join(relative))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
