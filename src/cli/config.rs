//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, Command};
use crate::config::RemovalConfig;
use anyhow::{Context, Result};

/// Convert CLI arguments to a `RemovalConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the removal configuration from the tuning flags
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        RemovalConfig::builder()
            .hue_range(cli.hue_min, cli.hue_max)
            .saturation_max(cli.saturation_max)
            .value_min(cli.value_min)
            .blur_kernel_size(cli.blur_kernel)
            .blur_sigma(cli.blur_sigma)
            .debug(cli.verbose >= 2)
            .build()
            .context("Invalid configuration")
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if let Command::Batch {
            output_dir: Some(output_dir),
            ..
        } = cli.mode()
        {
            if output_dir.is_file() {
                anyhow::bail!(
                    "Output path exists and is a file, not a directory: {}",
                    output_dir.display()
                );
            }
        }

        if cli.blur_kernel == 0 && cli.blur_sigma > 0.0 {
            log::warn!("--blur-sigma has no effect while --blur-kernel is 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("white-bgremove").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = CliConfigBuilder::from_cli(&parse(&["in.jpg"])).unwrap();
        assert_eq!(config, RemovalConfig::default());
    }

    #[test]
    fn test_tuning_flags_are_applied() {
        let cli = parse(&[
            "in.jpg",
            "--hue-min",
            "10",
            "--hue-max",
            "40",
            "--saturation-max",
            "60",
            "--value-min",
            "150",
            "--blur-kernel",
            "5",
            "--blur-sigma",
            "1.5",
            "-vv",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.thresholds.hue, (10, 40));
        assert_eq!(config.thresholds.saturation, (0, 60));
        assert_eq!(config.thresholds.value, (150, 255));
        assert_eq!(config.blur.kernel_size, 5);
        assert!((config.blur.sigma - 1.5).abs() < f32::EPSILON);
        assert!(config.debug);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(CliConfigBuilder::from_cli(&parse(&["in.jpg", "--blur-kernel", "4"])).is_err());
        assert!(
            CliConfigBuilder::from_cli(&parse(&["in.jpg", "--hue-min", "90", "--hue-max", "10"]))
                .is_err()
        );
        assert!(CliConfigBuilder::from_cli(&parse(&["in.jpg", "--hue-max", "200"])).is_err());
    }

    #[test]
    fn test_batch_output_must_not_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();

        let in_dir = dir.path().to_string_lossy().into_owned();
        let out = file.to_string_lossy().into_owned();
        let cli = parse(&["--batch", &in_dir, &out]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        let cli = parse(&["--batch", &in_dir]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());
    }
}
