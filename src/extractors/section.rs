// src/extractors/section.rs

// --- Imports ---
use crate::extractors::metadata::{ContractMetadata, MetadataExtractor};
use crate::utils::config::ScanConfig;
use crate::workbook::{CellValue, SpreadsheetRow};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

// --- Constants ---
/// Prefix of the cell that opens a unit subsection.
pub const UNIT_SENTINEL_PREFIX: &str = "SESC - ";
/// Selection value that captures every unit.
pub const ALL_UNITS: &str = "Todas";

const HEADER_KEYWORDS: [&str; 3] = ["descrição", "item", "código"];
const FOOTER_KEYWORDS: [&str; 4] = ["itens por unidade", "total", "observações", "subtotal"];

// --- Data Structures ---

/// Which unit sections to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSelection {
    All,
    Unit(String),
}

impl UnitSelection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == ALL_UNITS {
            UnitSelection::All
        } else {
            UnitSelection::Unit(value.to_string())
        }
    }

    /// A unit is selected by its full sentinel text or by its display name.
    pub fn matches(&self, sentinel: &UnitSentinel) -> bool {
        match self {
            UnitSelection::All => true,
            UnitSelection::Unit(wanted) => wanted == &sentinel.text || wanted == &sentinel.name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            UnitSelection::All => ALL_UNITS,
            UnitSelection::Unit(unit) => unit,
        }
    }
}

/// A sentinel cell found in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSentinel {
    /// Trimmed cell text, e.g. `SESC - Unidade A`
    pub text: String,
    /// Remainder after the prefix, e.g. `Unidade A`
    pub name: String,
}

impl UnitSentinel {
    /// First string cell of the row whose trimmed text starts with the prefix.
    pub fn find(row: &SpreadsheetRow) -> Option<Self> {
        row.cells.iter().filter_map(CellValue::as_str).find_map(Self::from_text)
    }

    fn from_text(raw: &str) -> Option<Self> {
        let text = raw.trim();
        let name = text.strip_prefix(UNIT_SENTINEL_PREFIX)?;
        Some(Self { text: text.to_string(), name: name.trim().to_string() })
    }
}

/// Column name → cell text for one data row. Keys keep header order;
/// a repeated column name overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn insert(&mut self, key: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub metadata: ContractMetadata,
    pub records: Vec<Record>,
}

impl ExtractionResult {
    /// Keys of the first record, which define the report columns.
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// What the scanner did with a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Sentinel { unit: String, selected: bool },
    Header,
    Record,
    Blank,
    Footer,
    EmptyRecord,
    Ignored,
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Sentinel { unit, selected: true } => write!(f, "sentinel (selected): {unit}"),
            RowOutcome::Sentinel { unit, selected: false } => write!(f, "sentinel (skipped): {unit}"),
            RowOutcome::Header => f.write_str("header"),
            RowOutcome::Record => f.write_str("record"),
            RowOutcome::Blank => f.write_str("blank"),
            RowOutcome::Footer => f.write_str("footer"),
            RowOutcome::EmptyRecord => f.write_str("empty record"),
            RowOutcome::Ignored => f.write_str("ignored"),
        }
    }
}

/// Per-section capture state.
#[derive(Debug, Clone, PartialEq, Default)]
enum SectionState {
    /// Outside any selected section
    #[default]
    Idle,
    AwaitingHeader,
    Capturing { header: Vec<String> },
}

// --- Scanner ---

/// Single-pass classifier over the rows of one document.
pub struct SectionScanner {
    selection: UnitSelection,
    state: SectionState,
    metadata: MetadataExtractor,
    records: Vec<Record>,
}

impl SectionScanner {
    pub fn new(selection: UnitSelection, config: ScanConfig) -> Self {
        Self {
            selection,
            state: SectionState::Idle,
            metadata: MetadataExtractor::new(config.metadata_row_limit),
            records: Vec::new(),
        }
    }

    /// Processes one row. Metadata is observed first and never stops the
    /// row; a sentinel then takes precedence over header and record handling.
    pub fn process(&mut self, row: &SpreadsheetRow) -> RowOutcome {
        self.metadata.observe(row);

        if let Some(sentinel) = UnitSentinel::find(row) {
            let selected = self.selection.matches(&sentinel);
            tracing::debug!("Row {}: unit '{}' (selected: {})", row.index, sentinel.text, selected);
            self.state = if selected { SectionState::AwaitingHeader } else { SectionState::Idle };
            return RowOutcome::Sentinel { unit: sentinel.text, selected };
        }

        match &self.state {
            SectionState::Idle => RowOutcome::Ignored,
            SectionState::AwaitingHeader => match header_names(row) {
                Some(header) => {
                    tracing::debug!("Row {}: header {:?}", row.index, header);
                    self.state = SectionState::Capturing { header };
                    RowOutcome::Header
                }
                None => RowOutcome::Ignored,
            },
            SectionState::Capturing { header } => {
                if row.is_blank() {
                    return RowOutcome::Blank;
                }
                if is_footer(row) {
                    return RowOutcome::Footer;
                }
                let record = build_record(header, row);
                if record.is_empty() {
                    return RowOutcome::EmptyRecord;
                }
                self.records.push(record);
                RowOutcome::Record
            }
        }
    }

    pub fn finish(self) -> ExtractionResult {
        ExtractionResult { metadata: self.metadata.finish(), records: self.records }
    }
}

/// The row's column names if any string cell carries a header keyword.
fn header_names(row: &SpreadsheetRow) -> Option<Vec<String>> {
    let is_header = row.cells.iter().filter_map(CellValue::as_str).any(|text| {
        let lower = text.to_lowercase();
        HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
    });
    is_header.then(|| row.cells.iter().map(|c| c.to_text().unwrap_or_default()).collect())
}

fn is_footer(row: &SpreadsheetRow) -> bool {
    let lower = row.line_text().to_lowercase();
    FOOTER_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn build_record(header: &[String], row: &SpreadsheetRow) -> Record {
    let mut record = Record::default();
    for (i, name) in header.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        record.insert(name, row.cell(i).to_text().unwrap_or_default());
    }
    record
}

// --- Entry Points ---

/// Scans all rows for the selected unit(s).
pub fn extract<'a, I>(rows: I, selection: &UnitSelection, config: ScanConfig) -> ExtractionResult
where
    I: IntoIterator<Item = &'a SpreadsheetRow>,
{
    extract_with_trace(rows, selection, config).0
}

/// Like [`extract`], also returning each row's outcome in scan order.
pub fn extract_with_trace<'a, I>(
    rows: I,
    selection: &UnitSelection,
    config: ScanConfig,
) -> (ExtractionResult, Vec<(usize, RowOutcome)>)
where
    I: IntoIterator<Item = &'a SpreadsheetRow>,
{
    let mut scanner = SectionScanner::new(selection.clone(), config);
    let mut trace = Vec::new();

    for row in rows {
        let outcome = scanner.process(row);
        tracing::trace!("Row {}: {}", row.index, outcome);
        trace.push((row.index, outcome));
    }

    let result = scanner.finish();
    tracing::info!("Extracted {} records for '{}'", result.records.len(), selection.label());
    (result, trace)
}

/// Sorted, de-duplicated sentinel texts found anywhere in the rows.
pub fn list_units<'a, I>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SpreadsheetRow>,
{
    let units: BTreeSet<String> = rows
        .into_iter()
        .flat_map(|row| row.cells.iter())
        .filter_map(CellValue::as_str)
        .filter_map(UnitSentinel::from_text)
        .map(|s| s.text)
        .collect();
    units.into_iter().collect()
}
