pub mod csv_export;
pub mod file;
pub mod png_export;

pub use csv_export::CsvExporter;
pub use png_export::PngExporter;

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::model::TimelineLayout;
use crate::notify::{Notification, Notify};

/// Writes a laid-out timeline to a file.
pub trait Exporter {
    fn name(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, layout: &TimelineLayout<'_>, path: &Path) -> Result<(), ExportError>;
}

/// Export `layout` to `path` and report the result with exactly one
/// notification. Output goes to a sibling temporary file first, so a
/// failed export never leaves a partial file behind.
pub fn run_export(exporter: &dyn Exporter, layout: &TimelineLayout<'_>, path: &Path, notifier: &dyn Notify) -> bool {
    match write_atomically(exporter, layout, path) {
        Ok(()) => {
            notifier.notify(Notification::success(format!(
                "Exported {} to {}",
                exporter.name(),
                path.display()
            )));
            true
        }
        Err(e) => {
            notifier.notify(Notification::failure(format!("{} export failed: {e}", exporter.name())));
            false
        }
    }
}

fn write_atomically(exporter: &dyn Exporter, layout: &TimelineLayout<'_>, path: &Path) -> Result<(), ExportError> {
    if layout.lanes.is_empty() {
        return Err(ExportError::EmptyLayout);
    }
    let partial = partial_path(path);
    let written = exporter
        .write(layout, &partial)
        .and_then(|()| std::fs::rename(&partial, path).map_err(ExportError::from));
    if written.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    written
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.partial"))
}
