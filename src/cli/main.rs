//! White background removal CLI tool
//!
//! Three modes: interactive (no arguments), batch (`--batch <dir>`) and
//! single file (`<input> [output]`).

use super::config::CliConfigBuilder;
#[cfg(feature = "gui")]
use super::interactive::NativeDialogPicker;
use super::interactive::{run_interactive, ConsolePicker, InteractiveOutcome};
use crate::{
    batch::{BatchOutcome, BatchProcessor},
    classifier::BackgroundClassifier,
    config::RemovalConfig,
    services::{
        BatchProcessingStats, ConsoleProgressReporter, ImageIOService, ProcessingStage,
        ProgressReporter,
    },
    tracing_config::{init_cli_tracing, spans},
    types::ProcessingTimings,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Remove near-white backgrounds and save RGBA PNGs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "white-bgremove")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image, or input directory with --batch. Omit for interactive mode
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file, or output directory with --batch [default: next to the input, as <stem>_no_bg.png]
    #[arg(value_name = "OUTPUT", requires = "input")]
    pub output: Option<PathBuf>,

    /// Process every supported image in the INPUT directory
    #[arg(long, requires = "input")]
    pub batch: bool,

    /// Also process images in subdirectories (batch mode only)
    #[arg(short, long, requires = "batch")]
    pub recursive: bool,

    /// Lowest hue treated as background (half-degrees, 0-180)
    #[arg(long, default_value_t = 0)]
    pub hue_min: u8,

    /// Highest hue treated as background (half-degrees, 0-180)
    #[arg(long, default_value_t = 180)]
    pub hue_max: u8,

    /// Highest saturation treated as background
    #[arg(long, default_value_t = 25)]
    pub saturation_max: u8,

    /// Lowest brightness treated as background
    #[arg(long, default_value_t = 200)]
    pub value_min: u8,

    /// Mask blur kernel size (odd, up to 31; 0 keeps the mask binary)
    #[arg(long, default_value_t = 3)]
    pub blur_kernel: u32,

    /// Mask blur sigma (0 derives it from the kernel size)
    #[arg(long, default_value_t = 0.0)]
    pub blur_sigma: f32,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE and mask statistics)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the batch progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Interactive mode: prompt on the terminal instead of opening file dialogs
    #[arg(long, conflicts_with = "input")]
    pub console: bool,
}

/// What the parsed arguments ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `console` selects terminal prompts over native dialogs
    Interactive {
        console: bool,
    },
    Batch {
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        recursive: bool,
    },
    SingleFile {
        input: PathBuf,
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Resolve the run mode from the parsed flags
    #[must_use]
    pub fn mode(&self) -> Command {
        match (&self.input, self.batch) {
            (None, _) => Command::Interactive {
                console: self.console || !cfg!(feature = "gui"),
            },
            (Some(input_dir), true) => Command::Batch {
                input_dir: input_dir.clone(),
                output_dir: self.output.clone(),
                recursive: self.recursive,
            },
            (Some(input), false) => Command::SingleFile {
                input: input.clone(),
                output: self.output.clone(),
            },
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    run(&cli)
}

/// Execute the parsed command line
///
/// # Errors
/// Invalid arguments, and failures that stop the whole run: a bad input in
/// single-file mode or a missing input directory in batch mode.
pub fn run(cli: &Cli) -> Result<()> {
    CliConfigBuilder::validate_cli(cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(cli)?;

    match cli.mode() {
        Command::Interactive { console } => run_interactive_mode(config, console),
        Command::Batch {
            input_dir,
            output_dir,
            recursive,
        } => run_batch_mode(
            config,
            &input_dir,
            output_dir.as_deref(),
            recursive,
            !cli.no_progress,
            cli.verbose > 0,
        ),
        Command::SingleFile { input, output } => {
            run_single_file_mode(config, &input, output.as_deref())
        },
    }
}

/// Errors are shown to the user and end the session cleanly
fn run_interactive_mode(config: RemovalConfig, console: bool) -> Result<()> {
    let classifier = BackgroundClassifier::new(config)?;

    let outcome = if console {
        let stdin = io::stdin();
        run_interactive(&mut ConsolePicker::new(stdin.lock(), io::stdout()), &classifier)
    } else {
        run_dialogs(&classifier)
    };

    match outcome {
        Ok(InteractiveOutcome::Failed(message)) => warn!("{}", message),
        Ok(InteractiveOutcome::Saved(_) | InteractiveOutcome::Cancelled) => {},
        Err(e) if console => warn!("Interactive session aborted: {}", e),
        Err(e) => warn!(
            "Interactive session aborted: {} (use --console for terminal prompts)",
            e
        ),
    }
    Ok(())
}

#[cfg(feature = "gui")]
fn run_dialogs(classifier: &BackgroundClassifier) -> io::Result<InteractiveOutcome> {
    run_interactive(&mut NativeDialogPicker::new(), classifier)
}

#[cfg(not(feature = "gui"))]
fn run_dialogs(classifier: &BackgroundClassifier) -> io::Result<InteractiveOutcome> {
    let stdin = io::stdin();
    run_interactive(&mut ConsolePicker::new(stdin.lock(), io::stdout()), classifier)
}

fn run_single_file_mode(config: RemovalConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let output = output.map_or_else(|| ImageIOService::default_output_path(input), Path::to_path_buf);
    let classifier = BackgroundClassifier::new(config)?;

    let span = spans::file_processing(input, &output);
    let _guard = span.enter();

    info!("Processing: {}", input.display());
    info!("Output: {}", output.display());

    let result = classifier
        .process_file_to(input, &output)
        .with_context(|| format!("Failed to remove background from {}", input.display()))?;

    info!("Success! Image saved to: {}", output.display());
    log::debug!("{}", result.timing_summary());
    Ok(())
}

fn run_batch_mode(
    config: RemovalConfig,
    input_dir: &Path,
    output_dir: Option<&Path>,
    recursive: bool,
    show_progress: bool,
    verbose: bool,
) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    let reporter: Box<dyn ProgressReporter> = if show_progress {
        Box::new(ProgressBarReporter::new())
    } else {
        Box::new(ConsoleProgressReporter::new(verbose))
    };

    let processor = BatchProcessor::new(config)?
        .recursive(recursive)
        .cancel_flag(cancel)
        .reporter(reporter);

    let span = spans::batch_processing(input_dir, recursive);
    let _guard = span.enter();
    let start_time = Instant::now();

    let outcome = processor
        .run(input_dir, output_dir)
        .with_context(|| format!("Batch processing of {} failed", input_dir.display()))?;

    match outcome {
        BatchOutcome::NoMatchingFiles => {
            info!("No image files found in: {}", input_dir.display());
        },
        BatchOutcome::Completed(summary) => {
            if summary.cancelled {
                warn!(
                    "Interrupted: {} of {} image(s) completed",
                    summary.processed, summary.found
                );
            }
            if !summary.failures.is_empty() {
                warn!(
                    "Some files failed to process. Processed: {}, Failed: {}",
                    summary.processed,
                    summary.failed()
                );
                for (path, reason) in &summary.failures {
                    warn!("  • {}: {}", path.display(), reason);
                }
            }

            let total_time = start_time.elapsed();
            info!("📊 Batch processing summary:");
            info!("  ├─ Files processed: {}", summary.processed);
            info!("  ├─ Files failed: {}", summary.failed());
            info!("  ├─ Total time: {:.2}s", total_time.as_secs_f64());
            info!(
                "  └─ Average per file: {:.2}s",
                if summary.processed > 0 {
                    total_time.as_secs_f64() / summary.processed as f64
                } else {
                    0.0
                }
            );
        },
    }

    Ok(())
}

/// Batch progress shown as an indicatif bar
struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn report_batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn report_batch_progress(&self, stats: &BatchProcessingStats) {
        self.bar
            .set_message(format!("Processing {}", stats.current_item_name));
    }

    fn report_completion(&self, _input: &Path, _timings: &ProcessingTimings) {
        self.bar.inc(1);
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.bar
            .println(format!("❌ Error during {}: {}", stage.description(), error));
        self.bar.inc(1);
    }

    fn report_batch_finished(&self, stats: &BatchProcessingStats) {
        self.bar.finish_with_message(format!(
            "Completed! Processed: {}, Failed: {}",
            stats.items_completed, stats.items_failed
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("white-bgremove").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_interactive() {
        assert_eq!(
            parse(&[]).unwrap().mode(),
            Command::Interactive {
                console: !cfg!(feature = "gui"),
            }
        );
    }

    #[test]
    fn test_console_flag_selects_terminal_prompts() {
        assert_eq!(
            parse(&["--console"]).unwrap().mode(),
            Command::Interactive { console: true }
        );
        assert!(parse(&["--console", "photo.jpg"]).is_err());
    }

    #[test]
    fn test_single_file_mode() {
        assert_eq!(
            parse(&["photo.jpg"]).unwrap().mode(),
            Command::SingleFile {
                input: PathBuf::from("photo.jpg"),
                output: None,
            }
        );
        assert_eq!(
            parse(&["photo.jpg", "out.png"]).unwrap().mode(),
            Command::SingleFile {
                input: PathBuf::from("photo.jpg"),
                output: Some(PathBuf::from("out.png")),
            }
        );
    }

    #[test]
    fn test_batch_mode() {
        assert_eq!(
            parse(&["--batch", "photos"]).unwrap().mode(),
            Command::Batch {
                input_dir: PathBuf::from("photos"),
                output_dir: None,
                recursive: false,
            }
        );
        assert_eq!(
            parse(&["--batch", "photos", "out", "-r"]).unwrap().mode(),
            Command::Batch {
                input_dir: PathBuf::from("photos"),
                output_dir: Some(PathBuf::from("out")),
                recursive: true,
            }
        );
    }

    #[test]
    fn test_batch_requires_input_directory() {
        assert!(parse(&["--batch"]).is_err());
    }

    #[test]
    fn test_recursive_requires_batch() {
        assert!(parse(&["photo.jpg", "--recursive"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        assert_eq!(parse(&["-vvv", "a.png"]).unwrap().verbose, 3);
    }

    #[test]
    fn test_single_file_missing_input_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.png");
        let cli = parse(&[input.to_str().unwrap()]).unwrap();

        assert!(run(&cli).is_err());
        assert!(!dir.path().join("missing_no_bg.png").exists());
    }

    #[test]
    fn test_single_file_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("logo.png");
        image::DynamicImage::new_rgb8(3, 3).save(&input).unwrap();
        let cli = parse(&[input.to_str().unwrap()]).unwrap();

        run(&cli).unwrap();
        assert!(dir.path().join("logo_no_bg.png").is_file());
    }

    #[test]
    fn test_invalid_tuning_is_rejected_before_processing() {
        let cli = parse(&["photo.jpg", "--blur-kernel", "8"]).unwrap();
        assert!(run(&cli).is_err());
    }
}
