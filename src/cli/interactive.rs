//! Interactive mode: pick one image, pick where to save it, process it

use crate::classifier::BackgroundClassifier;
use crate::services::{ImageIOService, SUPPORTED_EXTENSIONS};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Source of file selections and sink for user-facing messages
///
/// `None` from either pick method means the user cancelled.
pub trait FilePicker {
    fn pick_input(&mut self) -> io::Result<Option<PathBuf>>;

    /// Ask where to save, proposing `suggested`
    fn pick_output(&mut self, suggested: &Path) -> io::Result<Option<PathBuf>>;

    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()>;

    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()>;
}

/// Line-based picker over any reader and writer
///
/// An empty input answer or end of input cancels. An empty output answer
/// accepts the suggested path.
pub struct ConsolePicker<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsolePicker<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect what was printed
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", message)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        // Terminals quote dragged-in paths
        Ok(Some(
            line.trim().trim_matches(|c| c == '"' || c == '\'').to_string(),
        ))
    }
}

impl<R: BufRead, W: Write> FilePicker for ConsolePicker<R, W> {
    fn pick_input(&mut self) -> io::Result<Option<PathBuf>> {
        let message = format!(
            "Select an image ({}), empty to cancel: ",
            SUPPORTED_EXTENSIONS.join(", ")
        );
        Ok(self
            .prompt(&message)?
            .filter(|answer| !answer.is_empty())
            .map(PathBuf::from))
    }

    fn pick_output(&mut self, suggested: &Path) -> io::Result<Option<PathBuf>> {
        let message = format!("Save the image without background as [{}]: ", suggested.display());
        Ok(self.prompt(&message)?.map(|answer| {
            if answer.is_empty() {
                suggested.to_path_buf()
            } else {
                PathBuf::from(answer)
            }
        }))
    }

    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()> {
        writeln!(self.writer, "{}: {}", title, message)
    }

    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()> {
        writeln!(self.writer, "❌ {}: {}", title, message)
    }
}

/// Picker backed by the platform's native open, save and message dialogs
///
/// Messages are also logged so they show up on the console.
#[cfg(feature = "gui")]
#[derive(Debug, Default)]
pub struct NativeDialogPicker;

#[cfg(feature = "gui")]
impl NativeDialogPicker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn show_message(
        level: native_dialog::MessageLevel,
        title: &str,
        message: &str,
    ) -> io::Result<()> {
        native_dialog::DialogBuilder::message()
            .set_level(level)
            .set_title(title)
            .set_text(message)
            .alert()
            .show()
            .map_err(dialog_error)
    }
}

#[cfg(feature = "gui")]
fn dialog_error(e: native_dialog::Error) -> io::Error {
    io::Error::other(format!("dialog failed: {}", e))
}

#[cfg(feature = "gui")]
impl FilePicker for NativeDialogPicker {
    fn pick_input(&mut self) -> io::Result<Option<PathBuf>> {
        native_dialog::DialogBuilder::file()
            .set_title("Select an image")
            .add_filter("Image files", &SUPPORTED_EXTENSIONS[..])
            .open_single_file()
            .show()
            .map_err(dialog_error)
    }

    fn pick_output(&mut self, suggested: &Path) -> io::Result<Option<PathBuf>> {
        let mut dialog = native_dialog::DialogBuilder::file()
            .set_title("Save the image without background as")
            .add_filter("PNG image", &["png"]);
        if let Some(dir) = suggested.parent().filter(|d| !d.as_os_str().is_empty()) {
            dialog = dialog.set_location(dir);
        }
        if let Some(name) = suggested.file_name() {
            let name = name.to_string_lossy();
            dialog = dialog.set_filename(&*name);
        }
        dialog.save_single_file().show().map_err(dialog_error)
    }

    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()> {
        log::info!("{}: {}", title, message);
        Self::show_message(native_dialog::MessageLevel::Info, title, message)
    }

    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()> {
        log::error!("{}: {}", title, message);
        Self::show_message(native_dialog::MessageLevel::Error, title, message)
    }
}

/// How an interactive session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveOutcome {
    Cancelled,
    Saved(PathBuf),
    /// Processing failed; the message was already shown to the user
    Failed(String),
}

/// Drive one pick → process → report cycle
///
/// Invalid selections are reported and asked again. Processing errors are
/// shown through the picker and returned as [`InteractiveOutcome::Failed`].
///
/// # Errors
/// Only I/O errors of the picker itself.
pub fn run_interactive<P: FilePicker + ?Sized>(
    picker: &mut P,
    classifier: &BackgroundClassifier,
) -> io::Result<InteractiveOutcome> {
    let input = loop {
        let Some(candidate) = picker.pick_input()? else {
            picker.show_info("Cancelled", "No image was selected.")?;
            return Ok(InteractiveOutcome::Cancelled);
        };
        match validate_selection(&candidate) {
            Ok(()) => break candidate,
            Err(reason) => picker.show_error("Invalid selection", &reason)?,
        }
    };

    let suggested = ImageIOService::default_output_path(&input);
    let Some(mut output) = picker.pick_output(&suggested)? else {
        picker.show_info("Cancelled", "Operation cancelled.")?;
        return Ok(InteractiveOutcome::Cancelled);
    };
    if output.extension().is_none() {
        output.set_extension("png");
    }

    log::info!("Processing: {}", input.display());
    log::info!("Saving to: {}", output.display());

    match classifier.process_file_to(&input, &output) {
        Ok(_) => {
            picker.show_info(
                "Success",
                &format!("Image saved to {}", output.display()),
            )?;
            Ok(InteractiveOutcome::Saved(output))
        },
        Err(e) => {
            let message = format!("Failed to process the image: {}", e);
            picker.show_error("Error", &message)?;
            Ok(InteractiveOutcome::Failed(message))
        },
    }
}

fn validate_selection(path: &Path) -> Result<(), String> {
    ImageIOService::validate_input(path).map_err(|e| e.to_string())?;
    if !ImageIOService::is_supported_format(path) {
        return Err(format!(
            "Unsupported file type: {} (expected one of {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }
    Ok(())
}
