//! Services separating I/O and progress reporting from the pixel logic

pub mod io;
pub mod progress;

pub use io::{ImageIOService, OUTPUT_SUFFIX, SUPPORTED_EXTENSIONS};
pub use progress::{
    BatchProcessingStats, ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage,
    ProgressReporter,
};
