//! Reporter module for output formatting and exports

pub mod console;
pub mod json;
pub mod text;

pub use crate::config::ExportFormat;
pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use text::TextReporter;

use crate::schema::Schema;
use crate::QuizResult;
use anyhow::{Context, Result};
use std::path::Path;

/// Render a result in the given format
pub fn render_export(schema: &Schema, result: &QuizResult, format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => JsonReporter::new().pretty().report(result),
        ExportFormat::Text => TextReporter::new().report(schema, result),
    }
}

/// Write a result to a file. The format is inferred from the extension when not given.
pub fn export_result(
    schema: &Schema,
    result: &QuizResult,
    path: &Path,
    format: Option<ExportFormat>,
) -> Result<ExportFormat> {
    let format = format.unwrap_or_else(|| ExportFormat::from_path(path));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, render_export(schema, result, format))
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    log::debug!("exported result as {:?} to {}", format, path.display());
    Ok(format)
}
