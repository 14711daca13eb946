// src/report/mod.rs
pub mod layout;
pub mod numeric;
pub mod writer;

use crate::extractors::section::ExtractionResult;
use crate::utils::error::ExportError;
use layout::ReportLayout;

/// Builds the formatted report for `result` and returns the xlsx bytes.
/// Nothing is produced when there are no records.
pub async fn export_report(
    result: &ExtractionResult,
    unit_label: Option<&str>,
) -> Result<Vec<u8>, ExportError> {
    let generated_at = chrono::Local::now().naive_local();
    let layout = ReportLayout::build(result, unit_label, generated_at)?;
    tracing::info!(
        "Rendering report '{}' with {} records",
        layout.sheet_name,
        result.records.len()
    );

    tokio::task::spawn_blocking(move || writer::render_xlsx(&layout))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
}
