//! CLI module for the white-bgremove binary
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
mod interactive;
#[path = "main.rs"]
mod main_impl;

#[cfg(feature = "gui")]
pub use interactive::NativeDialogPicker;
pub use interactive::{run_interactive, ConsolePicker, FilePicker, InteractiveOutcome};
pub use main_impl::{main, run, Cli, Command};
