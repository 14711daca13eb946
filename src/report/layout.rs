// src/report/layout.rs
//! Cell-by-cell plan of the exported report, independent of the xlsx writer.

use crate::extractors::metadata::MetadataField;
use crate::extractors::section::ExtractionResult;
use crate::report::numeric::{is_numeric_column, normalize};
use crate::utils::error::ExportError;
use chrono::NaiveDateTime;
use std::collections::HashMap;

// --- Constants ---
pub const REPORT_TITLE: &str = "RELATÓRIO DE DADOS FILTRADOS";
pub const DEFAULT_SHEET_NAME: &str = "Dados Filtrados";
const MISSING_VALUE: &str = "-";

/// Columns A..F carry the title, the long metadata values and the footer.
const BAND_COLUMNS: u16 = 6;
/// First metadata row (0-based, i.e. sheet row 3).
const METADATA_FIRST_ROW: u32 = 2;
/// Table header row (0-based, i.e. sheet row 10).
const TABLE_HEADER_ROW: u32 = METADATA_FIRST_ROW + MetadataField::ORDERED.len() as u32 + 2;
/// Rows between the last data row and the footer.
const FOOTER_GAP: u32 = 3;
const LONG_OBJETO_CHARS: usize = 50;
const EMPTY_CELL_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 50;

/// Visual role of a cell; the writer maps each to one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Title,
    MetadataLabel,
    MetadataValue,
    TableHeader,
    Text { striped: bool },
    Number { striped: bool },
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Number(f64),
}

impl CellContent {
    fn display_len(&self) -> usize {
        match self {
            CellContent::Text(s) if s.is_empty() => EMPTY_CELL_WIDTH,
            CellContent::Text(s) => s.chars().count(),
            CellContent::Number(n) if *n == 0.0 => EMPTY_CELL_WIDTH,
            CellContent::Number(n) => n.to_string().chars().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub row: u32,
    pub col: u16,
    pub content: CellContent,
    pub style: CellStyle,
}

/// A merged block; its text is written to the top-left cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRange {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
    pub text: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub sheet_name: String,
    pub cells: Vec<LayoutCell>,
    pub merges: Vec<MergedRange>,
    pub column_widths: Vec<f64>,
    /// 0-based row of the generation timestamp
    pub footer_row: u32,
}

impl ReportLayout {
    /// Plans the report for `result`. Fails with `EmptyResult` when there is nothing to show.
    pub fn build(
        result: &ExtractionResult,
        unit_label: Option<&str>,
        generated_at: NaiveDateTime,
    ) -> Result<Self, ExportError> {
        if result.records.is_empty() {
            return Err(ExportError::EmptyResult);
        }

        let columns = result.columns();
        let mut cells = Vec::new();
        let mut merges = Vec::new();

        // Title band
        merges.push(MergedRange {
            row: 0,
            first_col: 0,
            last_col: BAND_COLUMNS - 1,
            text: REPORT_TITLE.to_string(),
            style: CellStyle::Title,
        });

        // Metadata block
        for (i, field) in MetadataField::ORDERED.iter().enumerate() {
            let row = METADATA_FIRST_ROW + i as u32;
            let value = match result.metadata.get(*field) {
                "" => MISSING_VALUE,
                v => v,
            };
            cells.push(LayoutCell {
                row,
                col: 0,
                content: CellContent::Text(format!("{}:", field.label())),
                style: CellStyle::MetadataLabel,
            });
            let last_col =
                if *field == MetadataField::Objeto && value.chars().count() > LONG_OBJETO_CHARS {
                    BAND_COLUMNS - 1
                } else {
                    2
                };
            merges.push(MergedRange {
                row,
                first_col: 1,
                last_col,
                text: value.to_string(),
                style: CellStyle::MetadataValue,
            });
        }

        // Table header
        for (col, name) in columns.iter().enumerate() {
            cells.push(LayoutCell {
                row: TABLE_HEADER_ROW,
                col: col as u16,
                content: CellContent::Text(name.clone()),
                style: CellStyle::TableHeader,
            });
        }

        // Data rows; stripe parity follows the position in the whole record list
        for (i, record) in result.records.iter().enumerate() {
            let row = TABLE_HEADER_ROW + 1 + i as u32;
            let striped = i % 2 == 0;
            for (col, name) in columns.iter().enumerate() {
                let raw = record.get(name).unwrap_or("");
                let (content, style) = if is_numeric_column(name) {
                    (CellContent::Number(normalize(raw)), CellStyle::Number { striped })
                } else {
                    (CellContent::Text(raw.to_string()), CellStyle::Text { striped })
                };
                cells.push(LayoutCell { row, col: col as u16, content, style });
            }
        }

        // Generation footer
        let footer_row = TABLE_HEADER_ROW + result.records.len() as u32 + FOOTER_GAP;
        merges.push(MergedRange {
            row: footer_row,
            first_col: 0,
            last_col: BAND_COLUMNS - 1,
            text: format!("Gerado em: {}", generated_at.format("%d/%m/%Y, %H:%M:%S")),
            style: CellStyle::Footer,
        });

        let column_count = (columns.len() as u16).max(BAND_COLUMNS);
        let last_data_row = TABLE_HEADER_ROW + result.records.len() as u32;
        let column_widths = column_widths(&cells, &merges, column_count, last_data_row);

        Ok(Self {
            sheet_name: sheet_name(unit_label),
            cells,
            merges,
            column_widths,
            footer_row,
        })
    }
}

/// `min(longest + 2, 50)` per column over every row up to the last data row.
/// Merged text counts in each column it spans; empty cells and zeros count as 10 characters.
fn column_widths(
    cells: &[LayoutCell],
    merges: &[MergedRange],
    column_count: u16,
    last_row: u32,
) -> Vec<f64> {
    let mut lengths: HashMap<(u32, u16), usize> = HashMap::new();
    for cell in cells {
        lengths.insert((cell.row, cell.col), cell.content.display_len());
    }
    for merge in merges {
        let len = if merge.text.is_empty() { EMPTY_CELL_WIDTH } else { merge.text.chars().count() };
        for col in merge.first_col..=merge.last_col {
            lengths.insert((merge.row, col), len);
        }
    }

    (0..column_count)
        .map(|col| {
            let longest = (0..=last_row)
                .map(|row| lengths.get(&(row, col)).copied().unwrap_or(EMPTY_CELL_WIDTH))
                .max()
                .unwrap_or(EMPTY_CELL_WIDTH);
            (longest + 2).min(MAX_COLUMN_WIDTH) as f64
        })
        .collect()
}

/// Worksheet names are limited to 31 characters and exclude `[]:*?/\`.
fn sheet_name(unit_label: Option<&str>) -> String {
    let label = unit_label.map(str::trim).filter(|l| !l.is_empty()).unwrap_or(DEFAULT_SHEET_NAME);
    let cleaned: String = label
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(31)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::metadata::ContractMetadata;
    use crate::extractors::section::Record;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|d| d.and_hms_opt(9, 30, 5))
            .unwrap_or_default()
    }

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut r = Record::default();
        for (k, v) in fields {
            r.insert(k, v.to_string());
        }
        r
    }

    fn sample() -> ExtractionResult {
        ExtractionResult {
            metadata: ContractMetadata {
                numero_ata: "RP-2024-SES-001-2".to_string(),
                ..Default::default()
            },
            records: vec![
                record(&[("Código", "A1"), ("Descrição", "Sabão"), ("Valor", "1.234,56")]),
                record(&[("Código", "A2"), ("Descrição", "Detergente"), ("Valor", "abc")]),
                // From another unit section with different columns
                record(&[("Item", "B1"), ("Saldo", "5")]),
            ],
        }
    }

    fn cell_at(layout: &ReportLayout, row: u32, col: u16) -> Option<&LayoutCell> {
        layout.cells.iter().find(|c| c.row == row && c.col == col)
    }

    #[test]
    fn empty_result_is_rejected() {
        let result = ExtractionResult::default();
        let err = ReportLayout::build(&result, Some("Todas"), generated_at());
        assert!(matches!(err, Err(ExportError::EmptyResult)));
    }

    #[test]
    fn metadata_block_uses_placeholders() {
        let layout = ReportLayout::build(&sample(), None, generated_at()).unwrap();

        let labels: Vec<_> = (2..7)
            .filter_map(|row| cell_at(&layout, row, 0))
            .map(|c| c.content.clone())
            .collect();
        assert_eq!(labels[0], CellContent::Text("Número da Ata:".to_string()));
        assert_eq!(labels[4], CellContent::Text("Final Vigência:".to_string()));

        let values: Vec<_> = layout
            .merges
            .iter()
            .filter(|m| m.style == CellStyle::MetadataValue)
            .map(|m| (m.text.as_str(), m.last_col))
            .collect();
        assert_eq!(
            values,
            vec![("RP-2024-SES-001-2", 2), ("-", 2), ("-", 2), ("-", 2), ("-", 2)]
        );
    }

    #[test]
    fn long_objeto_spans_to_column_f() {
        let mut result = sample();
        result.metadata.objeto = "x".repeat(51);
        let layout = ReportLayout::build(&result, None, generated_at()).unwrap();
        let objeto = layout.merges.iter().find(|m| m.row == 3).unwrap();
        assert_eq!((objeto.first_col, objeto.last_col), (1, 5));

        result.metadata.objeto = "x".repeat(50);
        let layout = ReportLayout::build(&result, None, generated_at()).unwrap();
        let objeto = layout.merges.iter().find(|m| m.row == 3).unwrap();
        assert_eq!(objeto.last_col, 2);
    }

    #[test]
    fn table_uses_first_record_columns_and_numeric_formatting() {
        let layout = ReportLayout::build(&sample(), Some("Todas"), generated_at()).unwrap();

        assert_eq!(
            cell_at(&layout, 9, 2).map(|c| (&c.content, c.style)),
            Some((&CellContent::Text("Valor".to_string()), CellStyle::TableHeader))
        );
        assert_eq!(
            cell_at(&layout, 10, 2).map(|c| c.content.clone()),
            Some(CellContent::Number(1234.56))
        );
        assert_eq!(
            cell_at(&layout, 11, 2).map(|c| c.content.clone()),
            Some(CellContent::Number(0.0))
        );
        // Third record lacks the first record's columns
        assert_eq!(
            cell_at(&layout, 12, 0).map(|c| c.content.clone()),
            Some(CellContent::Text(String::new()))
        );
        assert!(cell_at(&layout, 9, 3).is_none());
    }

    #[test]
    fn stripes_follow_global_record_position() {
        let layout = ReportLayout::build(&sample(), None, generated_at()).unwrap();
        let stripes: Vec<_> = (10..13)
            .filter_map(|row| cell_at(&layout, row, 1))
            .map(|c| c.style)
            .collect();
        assert_eq!(
            stripes,
            vec![
                CellStyle::Text { striped: true },
                CellStyle::Text { striped: false },
                CellStyle::Text { striped: true },
            ]
        );
        assert_eq!(cell_at(&layout, 10, 2).map(|c| c.style), Some(CellStyle::Number { striped: true }));
    }

    #[test]
    fn footer_sits_three_rows_after_data() {
        let layout = ReportLayout::build(&sample(), None, generated_at()).unwrap();
        assert_eq!(layout.footer_row, 9 + 3 + 3);
        let footer = layout.merges.last().unwrap();
        assert_eq!(footer.row, layout.footer_row);
        assert_eq!(footer.text, "Gerado em: 17/05/2024, 09:30:05");
        assert_eq!((footer.first_col, footer.last_col), (0, 5));
    }

    #[test]
    fn column_widths_are_clamped() {
        let layout = ReportLayout::build(&sample(), None, generated_at()).unwrap();
        assert_eq!(layout.column_widths.len(), 6);
        // The title (28 chars) spans A..F; the footer row is not measured
        assert_eq!(layout.column_widths[0], 30.0);
        assert_eq!(layout.column_widths[4], 30.0);

        let mut result = sample();
        result.records[0].insert("Descrição", "y".repeat(80));
        let layout = ReportLayout::build(&result, None, generated_at()).unwrap();
        assert_eq!(layout.column_widths[1], 50.0);
    }

    #[test]
    fn zero_values_measure_as_empty_cells() {
        let result = ExtractionResult {
            metadata: ContractMetadata::default(),
            records: vec![record(&[("Código", "A1"), ("Valor", "0")])],
        };
        let layout = ReportLayout::build(&result, None, generated_at()).unwrap();
        assert_eq!(layout.column_widths, vec![30.0; 6]);
    }

    #[test]
    fn merged_metadata_counts_in_every_spanned_column() {
        let mut result = sample();
        result.metadata.objeto = "o".repeat(40);
        let layout = ReportLayout::build(&result, None, generated_at()).unwrap();
        // Objeto is merged over B:C
        assert_eq!(layout.column_widths[1], 42.0);
        assert_eq!(layout.column_widths[2], 42.0);
        assert_eq!(layout.column_widths[3], 30.0);
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sheet_name(None), "Dados Filtrados");
        assert_eq!(sheet_name(Some("  ")), "Dados Filtrados");
        assert_eq!(sheet_name(Some("SESC - Unidade A")), "SESC - Unidade A");
        assert_eq!(sheet_name(Some("a/b:c")), "a_b_c");
        assert_eq!(sheet_name(Some(&"z".repeat(40))).chars().count(), 31);
    }
}
