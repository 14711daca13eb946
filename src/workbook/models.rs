// src/workbook/models.rs
use std::fmt;

/// Raw value of a single cell as read from the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Text content, only for string cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Cell rendered as text; `None` for an absent value.
    /// An empty string cell is still `Some("")`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Empty => None,
        }
    }

    /// Null, empty string or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
            CellValue::Empty => true,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Shortest round-trip form: `3`, `1234.5`, `-0.25`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One row of the first sheet, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetRow {
    /// 1-based sheet row number
    pub index: usize,
    /// Cells aligned from column A
    pub cells: Vec<CellValue>,
}

impl SpreadsheetRow {
    pub fn new(index: usize, cells: Vec<CellValue>) -> Self {
        Self { index, cells }
    }

    /// Non-empty stringified cells joined by a single space, trimmed.
    pub fn line_text(&self) -> String {
        self.cells
            .iter()
            .filter_map(CellValue::to_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }

    /// Cell at a 0-based column; missing trailing cells read as `Empty`.
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: Vec<CellValue>) -> SpreadsheetRow {
        SpreadsheetRow::new(1, cells)
    }

    #[test]
    fn line_text_skips_empty_cells() {
        let r = row(vec![
            CellValue::Empty,
            "Objeto:".into(),
            CellValue::Text(String::new()),
            " Material de limpeza ".into(),
            12.0.into(),
        ]);
        assert_eq!(r.line_text(), "Objeto:  Material de limpeza  12");
    }

    #[test]
    fn numbers_render_without_trailing_zeroes() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(1234.5).to_string(), "1234.5");
        assert_eq!(CellValue::Number(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn blank_detection_distinguishes_zero_from_empty() {
        assert!(row(vec![CellValue::Empty, "  ".into(), "".into()]).is_blank());
        assert!(!row(vec![CellValue::Empty, 0.0.into()]).is_blank());
        assert!(row(vec![]).is_blank());
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let r = row(vec!["a".into()]);
        assert_eq!(r.cell(0), &CellValue::Text("a".to_string()));
        assert_eq!(r.cell(7), &CellValue::Empty);
    }
}
