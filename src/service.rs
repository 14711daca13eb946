// src/service.rs
//! Request-level operations. Each call rereads and rescans the document.

use crate::extractors::section::{self, ExtractionResult, Record, UnitSelection};
use crate::report;
use crate::storage::{ReportSummary, StorageManager};
use crate::utils::config::ScanConfig;
use crate::utils::AppError;
use crate::workbook::reader::read_first_sheet;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Records shown by a preview.
pub const PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct UnitListing {
    pub units: Vec<String>,
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub preview: Vec<Record>,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub report_path: PathBuf,
    pub record_count: usize,
}

/// Lists the unit names found in the document.
pub async fn list_units(path: &Path) -> Result<UnitListing, AppError> {
    let rows = read_first_sheet(path).await?;
    let units = section::list_units(&rows);
    tracing::info!("Found {} units in {}", units.len(), path.display());
    Ok(UnitListing { units, file: path.display().to_string() })
}

/// First records and the column names for the selected unit.
pub async fn preview(path: &Path, selection: &UnitSelection, config: ScanConfig) -> Result<Preview, AppError> {
    let rows = read_first_sheet(path).await?;
    let result: ExtractionResult = section::extract(&rows, selection, config);
    let columns = result.columns();
    let preview = result.records.into_iter().take(PREVIEW_LIMIT).collect();
    Ok(Preview { columns, preview })
}

/// Full formatted export. Fails with the empty-result error when nothing matched.
pub async fn export(
    path: &Path,
    selection: &UnitSelection,
    config: ScanConfig,
    storage: &StorageManager,
    title: Option<&str>,
    debug: bool,
) -> Result<ExportOutcome, AppError> {
    let rows = read_first_sheet(path).await?;
    let (result, trace) = section::extract_with_trace(&rows, selection, config);
    let label = title.unwrap_or_else(|| selection.label());

    let bytes = match report::export_report(&result, Some(label)).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Export for '{}' failed: {}", label, e);
            return Err(e.into());
        }
    };

    let report_path = storage.save_report(&bytes)?;
    let summary = ReportSummary {
        unit: selection.label(),
        record_count: result.records.len(),
        metadata: &result.metadata,
    };
    if let Err(e) = storage.save_report_metadata(&report_path, &summary) {
        tracing::warn!("Failed to save report metadata: {}", e);
    }
    if debug {
        if let Err(e) = storage.save_scan_trace(&report_path, &trace) {
            tracing::warn!("Failed to save scan trace: {}", e);
        }
    }

    Ok(ExportOutcome { report_path, record_count: result.records.len() })
}
