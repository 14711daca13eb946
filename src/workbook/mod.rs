// src/workbook/mod.rs
pub mod models;
pub mod reader;

pub use models::{CellValue, SpreadsheetRow};
