// src/workbook/reader.rs
use crate::utils::error::ReadError;
use crate::workbook::models::{CellValue, SpreadsheetRow};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};

/// Reads every row of the first worksheet of the document at `path`.
/// The blocking calamine parse runs on tokio's blocking pool.
pub async fn read_first_sheet(path: &Path) -> Result<Vec<SpreadsheetRow>, ReadError> {
    let path: PathBuf = path.to_path_buf();
    tracing::info!("Reading document: {}", path.display());

    let rows = tokio::task::spawn_blocking(move || read_first_sheet_blocking(&path))
        .await
        .map_err(|e| ReadError::Task(e.to_string()))??;

    tracing::debug!("Read {} rows from first sheet", rows.len());
    Ok(rows)
}

fn read_first_sheet_blocking(path: &Path) -> Result<Vec<SpreadsheetRow>, ReadError> {
    let mut workbook = open_workbook_auto(path)?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReadError::NoSheets(path.display().to_string()))?;
    tracing::debug!("Using first sheet '{}'", first_sheet);

    let range = workbook.worksheet_range(&first_sheet)?;
    Ok(rows_from_range(&range))
}

/// Converts a calamine range into absolute, column-aligned rows.
pub(crate) fn rows_from_range(range: &Range<Data>) -> Vec<SpreadsheetRow> {
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let row_offset = row_offset as usize;
    let col_offset = col_offset as usize;

    range
        .rows()
        .enumerate()
        .map(|(i, cells)| {
            let mut values = Vec::with_capacity(col_offset + cells.len());
            values.resize(col_offset, CellValue::Empty);
            values.extend(cells.iter().map(cell_value));
            SpreadsheetRow::new(row_offset + i + 1, values)
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_are_absolute_and_column_aligned() {
        // Used area starts at B3
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("SESC - Unidade A".to_string()));
        range.set_value((3, 1), Data::Int(7));
        range.set_value((3, 2), Data::Float(1.5));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].index, 3);
        assert_eq!(
            rows[0].cells,
            vec![
                CellValue::Empty,
                CellValue::Text("SESC - Unidade A".to_string()),
                CellValue::Empty,
            ]
        );

        assert_eq!(rows[1].index, 4);
        assert_eq!(
            rows[1].cells,
            vec![CellValue::Empty, CellValue::Number(7.0), CellValue::Number(1.5)]
        );
    }

    #[test]
    fn booleans_become_text() {
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Text("true".to_string()));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = tokio_test::block_on(read_first_sheet(Path::new("does/not/exist.xlsx")));
        assert!(result.is_err());
    }
}
