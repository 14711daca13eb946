// src/utils/error.rs
use thiserror::Error;

// Errors raised while reading the source document
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet could not be parsed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Document has no worksheets: {0}")]
    NoSheets(String),

    #[error("Background read task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    // Kept apart from the other variants: the caller reports it as "nothing to filter"
    #[error("No records matched the selected unit")]
    EmptyResult,

    #[error("Spreadsheet writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Background export task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Failed to process document: {0}")]
    Read(#[from] ReadError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// True when the failure is the "nothing matched" condition rather than a processing fault.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, AppError::Export(ExportError::EmptyResult))
    }
}
