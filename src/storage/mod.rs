// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::metadata::ContractMetadata;
use crate::extractors::section::RowOutcome;
use crate::utils::error::StorageError;
use std::io::Write;

/// What is recorded next to each saved report.
#[derive(Debug, Clone)]
pub struct ReportSummary<'a> {
    pub unit: &'a str,
    pub record_count: usize,
    pub metadata: &'a ContractMetadata,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Picks an unused report path: filtrado_<unix-millis>.xlsx, with a suffix on collision
    fn next_report_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_millis();
        let mut candidate = self.base_dir.join(format!("filtrado_{}.xlsx", stamp));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.base_dir.join(format!("filtrado_{}_{}.xlsx", stamp, n));
            n += 1;
        }
        candidate
    }

    /// Saves report bytes under a fresh name. The file is written in full
    /// under a `.part` name and only then renamed into place.
    pub fn save_report(&self, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let file_path = self.next_report_path();
        write_atomically(&file_path, bytes)?;

        tracing::info!("Saved report to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the report in JSON format, next to it
    pub fn save_report_metadata(&self, report_path: &Path, summary: &ReportSummary) -> Result<PathBuf, StorageError> {
        let file_path = sibling_path(report_path, "meta.json");

        let metadata = serde_json::json!({
            "unit": summary.unit,
            "record_count": summary.record_count,
            "metadata": summary.metadata,
            "report_file": report_path.file_name().map(|n| n.to_string_lossy().to_string()),
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }

    /// Writes the per-row scan outcomes as `row<TAB>outcome` lines
    pub fn save_scan_trace(&self, report_path: &Path, trace: &[(usize, RowOutcome)]) -> Result<PathBuf, StorageError> {
        let file_path = sibling_path(report_path, "trace.tsv");

        let mut content = String::from("row\toutcome\n");
        for (row, outcome) in trace {
            content.push_str(&format!("{}\t{}\n", row, outcome));
        }

        fs::write(&file_path, content)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved scan trace to {}", file_path.display());

        Ok(file_path)
    }
}

/// Writes `bytes` to `<path>.part` and renames it onto `path`.
/// On any failure the `.part` file is removed.
fn write_atomically(file_path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let part_path = file_path.with_extension("xlsx.part");

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&part_path)
        .map_err(StorageError::IoError)?;

    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(&part_path);
        return Err(StorageError::IoError(e));
    }
    drop(file);

    if let Err(e) = fs::rename(&part_path, file_path) {
        let _ = fs::remove_file(&part_path);
        return Err(StorageError::IoError(e));
    }
    Ok(())
}

/// `<dir>/<stem>_<suffix>` for a report at `<dir>/<stem>.xlsx`
fn sibling_path(report_path: &Path, suffix: &str) -> PathBuf {
    let stem = report_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    report_path.with_file_name(format!("{}_{}", stem, suffix))
}
