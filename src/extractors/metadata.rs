// src/extractors/metadata.rs

// --- Imports ---
use crate::workbook::SpreadsheetRow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Data Structures ---

/// Contract-level fields found near the top of the report.
/// Each field is latched by the first successful match and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMetadata {
    pub numero_ata: String,
    pub objeto: String,
    pub negociacao: String,
    pub inicio_vigencia: String,
    pub final_vigencia: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    NumeroAta,
    Objeto,
    Negociacao,
    InicioVigencia,
    FinalVigencia,
}

impl MetadataField {
    /// Report label, in report order.
    pub const ORDERED: [MetadataField; 5] = [
        MetadataField::NumeroAta,
        MetadataField::Objeto,
        MetadataField::Negociacao,
        MetadataField::InicioVigencia,
        MetadataField::FinalVigencia,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetadataField::NumeroAta => "Número da Ata",
            MetadataField::Objeto => "Objeto",
            MetadataField::Negociacao => "Negociação",
            MetadataField::InicioVigencia => "Início Vigência",
            MetadataField::FinalVigencia => "Final Vigência",
        }
    }
}

impl ContractMetadata {
    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::NumeroAta => &self.numero_ata,
            MetadataField::Objeto => &self.objeto,
            MetadataField::Negociacao => &self.negociacao,
            MetadataField::InicioVigencia => &self.inicio_vigencia,
            MetadataField::FinalVigencia => &self.final_vigencia,
        }
    }

    fn slot(&mut self, field: MetadataField) -> &mut String {
        match field {
            MetadataField::NumeroAta => &mut self.numero_ata,
            MetadataField::Objeto => &mut self.objeto,
            MetadataField::Negociacao => &mut self.negociacao,
            MetadataField::InicioVigencia => &mut self.inicio_vigencia,
            MetadataField::FinalVigencia => &mut self.final_vigencia,
        }
    }
}

/// One heuristic for one field.
/// `trigger` gates the rule on the line text, `patterns` are tried in order and
/// the first capture (group 1, or the whole match if the pattern has no group)
/// wins. If every pattern misses, `next_cell_after` takes the cell following
/// the first cell matching that keyword.
pub struct MetadataRule {
    pub field: MetadataField,
    pub trigger: Option<Regex>,
    pub patterns: Vec<Regex>,
    pub next_cell_after: Option<Regex>,
}

impl MetadataRule {
    /// Returns the extracted value for this row, if any.
    pub fn apply(&self, line: &str, row: &SpreadsheetRow) -> Option<String> {
        if let Some(trigger) = &self.trigger {
            if !trigger.is_match(line) {
                return None;
            }
        }

        let from_patterns = self.patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            let value = caps.get(1).or_else(|| caps.get(0))?.as_str().trim();
            (!value.is_empty()).then(|| value.to_string())
        });
        if from_patterns.is_some() {
            return from_patterns;
        }

        let keyword = self.next_cell_after.as_ref()?;
        let idx = row.cells.iter().position(|cell| {
            cell.to_text().is_some_and(|text| keyword.is_match(&text))
        })?;
        let next = row.cells.get(idx + 1)?.to_text()?;
        let next = next.trim();
        (!next.is_empty()).then(|| next.to_string())
    }
}

const DATE: &str = r"(\d{2}/\d{2}/\d{4})";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("metadata pattern must compile")
}

// --- Rule Table (Lazy Static) ---
// Evaluated top to bottom; within a rule, patterns are in priority order.
pub static METADATA_RULES: Lazy<Vec<MetadataRule>> = Lazy::new(|| {
    vec![
        MetadataRule {
            field: MetadataField::NumeroAta,
            trigger: Some(compile(r"(?i)número da ata")),
            patterns: vec![compile(r"\b[A-Z]{2}-\d{4}-[A-Z]{3}-\d{3}-\d\b")],
            next_cell_after: None,
        },
        MetadataRule {
            field: MetadataField::Objeto,
            trigger: Some(compile(r"(?i)objeto")),
            patterns: vec![compile(r"(?i)objeto:\s*(.+)")],
            next_cell_after: Some(compile(r"(?i)objeto")),
        },
        MetadataRule {
            field: MetadataField::Negociacao,
            trigger: Some(compile(r"(?i)negocia[cç][aã]o")),
            patterns: vec![compile(r"(?i)negocia[cç][aã]o:\s*(.+)")],
            next_cell_after: Some(compile(r"(?i)negocia[cç][aã]o")),
        },
        MetadataRule {
            field: MetadataField::InicioVigencia,
            trigger: None,
            patterns: vec![
                compile(&format!(r"(?i)in[ií]cio.*?vig[eê]ncia.*?{DATE}")),
                compile(&format!(r"(?i){DATE}.*?in[ií]cio")),
            ],
            next_cell_after: None,
        },
        MetadataRule {
            field: MetadataField::FinalVigencia,
            trigger: None,
            patterns: vec![
                compile(&format!(r"(?i)fim.*?vig[eê]ncia.*?{DATE}")),
                compile(&format!(r"(?i){DATE}.*?fim")),
                compile(&format!(r"(?i)validade.*?at[eé].*?{DATE}")),
            ],
            next_cell_after: None,
        },
    ]
});

/// Accumulates contract metadata over the leading rows of a document.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    row_limit: usize,
    metadata: ContractMetadata,
}

impl MetadataExtractor {
    pub fn new(row_limit: usize) -> Self {
        Self { row_limit, metadata: ContractMetadata::default() }
    }

    /// Applies every rule whose field is still empty. Rows past the limit are ignored.
    pub fn observe(&mut self, row: &SpreadsheetRow) {
        if row.index > self.row_limit {
            return;
        }

        let line = row.line_text();
        for rule in METADATA_RULES.iter() {
            if !self.metadata.get(rule.field).is_empty() {
                continue;
            }
            if let Some(value) = rule.apply(&line, row) {
                tracing::debug!("Row {}: latched {:?} = '{}'", row.index, rule.field, value);
                *self.metadata.slot(rule.field) = value;
            }
        }
    }

    pub fn finish(self) -> ContractMetadata {
        self.metadata
    }
}
