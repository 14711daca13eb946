// src/utils/config.rs

/// Rows at or below this 1-based index are searched for contract metadata.
pub const DEFAULT_METADATA_ROW_LIMIT: usize = 20;

/// Environment override for the metadata window.
pub const METADATA_ROW_LIMIT_ENV: &str = "METADATA_ROW_LIMIT";

/// Tunables for a single scan of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub metadata_row_limit: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { metadata_row_limit: DEFAULT_METADATA_ROW_LIMIT }
    }
}

impl ScanConfig {
    /// Resolves the configuration: command-line value first, then the
    /// `METADATA_ROW_LIMIT` environment variable, then the default.
    pub fn resolve(cli_metadata_rows: Option<usize>) -> Self {
        Self::resolve_with(cli_metadata_rows, std::env::var(METADATA_ROW_LIMIT_ENV).ok())
    }

    fn resolve_with(cli_metadata_rows: Option<usize>, env_value: Option<String>) -> Self {
        if let Some(rows) = cli_metadata_rows {
            tracing::debug!("Using metadata row limit {} from command-line argument", rows);
            return Self { metadata_row_limit: rows };
        }

        match env_value.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(rows) => {
                    tracing::debug!("Using metadata row limit {} from {}", rows, METADATA_ROW_LIMIT_ENV);
                    Self { metadata_row_limit: rows }
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid {}='{}': {}", METADATA_ROW_LIMIT_ENV, raw, e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}
