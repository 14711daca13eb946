// src/report/numeric.rs

/// Columns that are always written as numbers in the report.
pub const NUMERIC_COLUMNS: [&str; 6] = ["Valor", "Saldo", "Inicial", "Solicitada", "Consumida", "Saldo Atual"];

pub fn is_numeric_column(name: &str) -> bool {
    NUMERIC_COLUMNS.contains(&name)
}

/// Coerces localized numeric text to a number.
///
/// Lossy on purpose: anything that does not parse becomes `0.0`, never an error.
/// When a comma is present it is the decimal separator and dots are thousands
/// separators (`1.234,56` → `1234.56`); otherwise dots are decimal points.
pub fn normalize(value: &str) -> f64 {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return 0.0;
    }

    let decimal = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };

    let cleaned: String = decimal
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            tracing::trace!("Unparsable numeric value '{}', using 0", value);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazilian_format() {
        assert_eq!(normalize("1.234,56"), 1234.56);
        assert_eq!(normalize("R$ 2.000.000,00"), 2_000_000.0);
        assert_eq!(normalize("10,5"), 10.5);
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(normalize("-50"), -50.0);
        assert_eq!(normalize("1234.5"), 1234.5);
        assert_eq!(normalize(" 7 "), 7.0);
        assert_eq!(normalize("0"), 0.0);
    }

    #[test]
    fn unparsable_becomes_zero() {
        assert_eq!(normalize(""), 0.0);
        assert_eq!(normalize("   "), 0.0);
        assert_eq!(normalize("abc"), 0.0);
        assert_eq!(normalize("-"), 0.0);
        assert_eq!(normalize("1-2"), 0.0);
    }

    #[test]
    fn only_listed_columns_are_numeric() {
        assert!(is_numeric_column("Saldo Atual"));
        assert!(is_numeric_column("Valor"));
        assert!(!is_numeric_column("valor"));
        assert!(!is_numeric_column("Descrição"));
    }
}
