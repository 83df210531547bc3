//! Progress reporting service
//!
//! This module separates progress reporting concerns from the batch loop,
//! allowing different frontends to implement their own progress handling.

use crate::types::ProcessingTimings;
use std::path::Path;

/// Progress stages during background removal processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Loading and decoding input image
    ImageLoading,
    /// Saving result to file
    FileSaving,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ImageLoading => "Loading image",
            Self::FileSaving => "Saving PNG",
        }
    }
}

/// Statistics for batch processing operations
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProcessingStats {
    /// Number of items completed
    pub items_completed: usize,
    /// Total number of items to process
    pub items_total: usize,
    /// Number of items that failed processing
    pub items_failed: usize,
    /// Name of the current item being processed
    pub current_item_name: String,
}

/// Trait for reporting progress during background removal operations
pub trait ProgressReporter: Send + Sync {
    /// A batch of `total` files is about to start
    fn report_batch_started(&self, _total: usize) {}

    /// A batch item is about to be processed
    fn report_batch_progress(&self, _stats: &BatchProcessingStats) {}

    /// One file was written successfully
    fn report_completion(&self, input: &Path, timings: &ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);

    /// The batch loop has exited
    fn report_batch_finished(&self, _stats: &BatchProcessingStats) {}
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_completion(&self, _input: &Path, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Console progress reporter that logs progress
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_batch_started(&self, total: usize) {
        log::info!("Found {} image(s) to process", total);
    }

    fn report_batch_progress(&self, stats: &BatchProcessingStats) {
        log::info!(
            "[{}/{}] Processing: {}",
            stats.items_completed + stats.items_failed + 1,
            stats.items_total,
            stats.current_item_name
        );
    }

    fn report_completion(&self, input: &Path, timings: &ProcessingTimings) {
        log::info!("✅ {} done in {}ms", input.display(), timings.total_ms);

        if self.verbose {
            log::info!("  📊 Detailed timings:");
            log::info!("    • Image decode: {}ms", timings.image_decode_ms);
            log::info!("    • Classification: {}ms", timings.classify_ms);
            log::info!("    • Mask blur: {}ms", timings.blur_ms);
            log::info!("    • Compositing: {}ms", timings.composite_ms);
            if let Some(encode_ms) = timings.image_encode_ms {
                log::info!("    • PNG encode: {}ms", encode_ms);
            }
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("❌ Error during {}: {}", stage.description(), error);
    }

    fn report_batch_finished(&self, stats: &BatchProcessingStats) {
        log::info!(
            "Completed! Processed: {}, Failed: {}",
            stats.items_completed,
            stats.items_failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingReporter {
        completions: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<(ProcessingStage, String)>>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_completion(&self, input: &Path, _timings: &ProcessingTimings) {
            self.completions
                .lock()
                .unwrap()
                .push(input.display().to_string());
        }

        fn report_error(&self, stage: ProcessingStage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }
    }

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(ProcessingStage::ImageLoading.description(), "Loading image");
        assert_eq!(ProcessingStage::FileSaving.description(), "Saving PNG");
    }

    #[test]
    fn test_default_batch_hooks_are_optional() {
        let reporter = RecordingReporter::default();
        let stats = BatchProcessingStats {
            items_completed: 1,
            items_total: 2,
            items_failed: 0,
            current_item_name: "b.png".to_string(),
        };
        reporter.report_batch_started(2);
        reporter.report_batch_progress(&stats);
        reporter.report_completion(Path::new("a.png"), &ProcessingTimings::default());
        reporter.report_error(ProcessingStage::ImageLoading, "bad data");
        reporter.report_batch_finished(&stats);

        assert_eq!(*reporter.completions.lock().unwrap(), vec!["a.png"]);
        assert_eq!(reporter.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_no_op_reporter() {
        let reporter = NoOpProgressReporter;
        reporter.report_completion(Path::new("x.png"), &ProcessingTimings::default());
        reporter.report_error(ProcessingStage::FileSaving, "ignored");
    }
}
