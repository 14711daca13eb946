// src/report/writer.rs
use crate::report::layout::{CellContent, CellStyle, ReportLayout};
use crate::utils::error::ExportError;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

const TITLE_FILL: u32 = 0xD9D9D9;
const LABEL_FILL: u32 = 0xF2F2F2;
const HEADER_FILL: u32 = 0x1F4E78;
const STRIPE_FILL: u32 = 0xF9F9F9;
const FOOTER_FONT: u32 = 0x666666;
const NUMBER_FORMAT: &str = "#,##0.00";

fn format_for(style: CellStyle) -> Format {
    match style {
        CellStyle::Title => Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(TITLE_FILL)),
        CellStyle::MetadataLabel => Format::new()
            .set_bold()
            .set_background_color(Color::RGB(LABEL_FILL))
            .set_border(FormatBorder::Thin),
        CellStyle::MetadataValue => Format::new().set_border(FormatBorder::Thin),
        CellStyle::TableHeader => Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_border(FormatBorder::Thin),
        CellStyle::Text { striped } => striped_fill(
            Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            striped,
        ),
        CellStyle::Number { striped } => striped_fill(
            Format::new()
                .set_align(FormatAlign::Right)
                .set_align(FormatAlign::VerticalCenter)
                .set_num_format(NUMBER_FORMAT)
                .set_border(FormatBorder::Thin),
            striped,
        ),
        CellStyle::Footer => Format::new()
            .set_italic()
            .set_font_color(Color::RGB(FOOTER_FONT))
            .set_align(FormatAlign::Right),
    }
}

fn striped_fill(format: Format, striped: bool) -> Format {
    if striped {
        format.set_background_color(Color::RGB(STRIPE_FILL))
    } else {
        format
    }
}

/// Serializes a planned report into xlsx bytes.
pub fn render_xlsx(layout: &ReportLayout) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&layout.sheet_name)?;

    for merge in &layout.merges {
        worksheet.merge_range(
            merge.row,
            merge.first_col,
            merge.row,
            merge.last_col,
            &merge.text,
            &format_for(merge.style),
        )?;
    }

    for cell in &layout.cells {
        let format = format_for(cell.style);
        match &cell.content {
            CellContent::Text(text) => {
                worksheet.write_string_with_format(cell.row, cell.col, text, &format)?;
            }
            CellContent::Number(number) => {
                worksheet.write_number_with_format(cell.row, cell.col, *number, &format)?;
            }
        }
    }

    for (col, width) in layout.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!("Rendered report '{}' ({} bytes)", layout.sheet_name, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::metadata::ContractMetadata;
    use crate::extractors::section::{ExtractionResult, Record};
    use crate::workbook::reader::read_first_sheet;
    use crate::workbook::CellValue;
    use chrono::NaiveDate;

    #[test]
    fn rendered_report_reads_back() {
        let mut record = Record::default();
        record.insert("Código", "A1".to_string());
        record.insert("Valor", "1.234,56".to_string());
        let result = ExtractionResult {
            metadata: ContractMetadata { objeto: "Limpeza".to_string(), ..Default::default() },
            records: vec![record],
        };
        let generated_at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap_or_default();
        let layout = ReportLayout::build(&result, Some("SESC - Unidade A"), generated_at).unwrap();

        let bytes = render_xlsx(&layout).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, &bytes).unwrap();

        let rows = tokio_test::block_on(read_first_sheet(&path)).unwrap();
        let text = |row: usize, col: usize| {
            rows.iter().find(|r| r.index == row).map(|r| r.cell(col).clone())
        };
        assert_eq!(text(1, 0), Some(CellValue::Text("RELATÓRIO DE DADOS FILTRADOS".to_string())));
        assert_eq!(text(4, 1), Some(CellValue::Text("Limpeza".to_string())));
        assert_eq!(text(10, 1), Some(CellValue::Text("Valor".to_string())));
        assert_eq!(text(11, 1), Some(CellValue::Number(1234.56)));
        assert_eq!(text(14, 0), Some(CellValue::Text("Gerado em: 02/01/2024, 03:04:05".to_string())));
    }
}
