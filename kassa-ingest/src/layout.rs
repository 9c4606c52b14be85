//! Per-bank description of a CSV statement's shape.

use serde::{Deserialize, Serialize};

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// The delimiter is handed to the CSV reader as a single byte, so
/// anything outside ASCII is a configuration error.
fn ascii_delimiter<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let delimiter = char::deserialize(deserializer)?;
    if delimiter.is_ascii() {
        Ok(delimiter)
    } else {
        Err(serde::de::Error::custom(format!(
            "delimiter {delimiter:?} must be an ASCII character"
        )))
    }
}

/// Column layout of one bank's CSV export. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvLayout {
    pub date_column: usize,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    pub details_column: usize,
    /// Column holding outgoing amounts; a non-empty value marks the
    /// row as an expense.
    #[serde(default)]
    pub expense_column: Option<usize>,
    /// Column holding incoming amounts, checked when the expense
    /// column is empty.
    #[serde(default)]
    pub income_column: Option<usize>,
    #[serde(default)]
    pub from_account_column: Option<usize>,
    #[serde(default)]
    pub to_account_column: Option<usize>,
    /// Counter-currency columns for cross-currency settlements.
    #[serde(default)]
    pub origin_currency_column: Option<usize>,
    #[serde(default)]
    pub origin_amount_column: Option<usize>,
    /// Leading rows to drop (headers, account banners).
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default = "default_delimiter", deserialize_with = "ascii_delimiter")]
    pub delimiter: char,
}
