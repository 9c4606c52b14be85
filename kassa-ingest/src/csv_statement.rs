//! Generic CSV statement parser driven by a [`CsvLayout`].
//!
//! Banks pad their exports with banners, running balances and summary
//! rows; anything without a parseable date or details text is skipped.
//! Malformed amounts on an otherwise valid row are real errors.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use kassa_core::{Money, Source, Transaction};

use crate::layout::CsvLayout;
use crate::StatementParser;

pub struct CsvStatementParser {
    layout: CsvLayout,
    source: Source,
}

impl CsvStatementParser {
    pub fn new(layout: CsvLayout, source: Source) -> Self {
        CsvStatementParser { layout, source }
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<Transaction>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.layout.delimiter as u8)
            .from_reader(reader);

        let mut out = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.with_context(|| format!("row {} of {}", row + 1, self.source.file))?;
            if row < self.layout.skip_rows {
                continue;
            }

            let field = |column: Option<usize>| {
                column
                    .and_then(|i| record.get(i))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };

            let Some(date_text) = field(Some(self.layout.date_column)) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(date_text, &self.layout.date_format) else {
                tracing::debug!(row, date = date_text, "skipping row without a date");
                continue;
            };
            let Some(details) = field(Some(self.layout.details_column)) else {
                continue;
            };

            let expense = field(self.layout.expense_column);
            let income = field(self.layout.income_column);
            let (is_expense, amount_text) = match (expense, income) {
                (Some(text), _) => (true, Some(text)),
                (None, Some(text)) => (false, Some(text)),
                (None, None) => (true, None),
            };
            let amount = match amount_text {
                Some(text) => parse_amount(text, row, &self.source.file)?,
                None => Money::ZERO,
            };

            let origin_currency = field(self.layout.origin_currency_column)
                .map(str::to_string)
                .unwrap_or_default();
            let origin_amount = match field(self.layout.origin_amount_column) {
                Some(text) if !origin_currency.is_empty() => {
                    parse_amount(text, row, &self.source.file)?
                }
                _ => Money::ZERO,
            };
            if amount.is_zero() && origin_amount.is_zero() {
                tracing::debug!(row, details, "skipping row without amounts");
                continue;
            }

            out.push(Transaction {
                date,
                is_expense,
                from_account: field(self.layout.from_account_column)
                    .map(str::to_string)
                    .unwrap_or_default(),
                to_account: field(self.layout.to_account_column)
                    .map(str::to_string)
                    .unwrap_or_default(),
                details: details.to_string(),
                account_currency: self.source.account_currency.clone(),
                amount,
                origin_currency,
                origin_amount,
                source: self.source.clone(),
            });
        }
        Ok(out)
    }
}

impl StatementParser for CsvStatementParser {
    fn parse(&self, path: &Path) -> Result<Vec<Transaction>> {
        let file =
            File::open(path).with_context(|| format!("opening statement {}", path.display()))?;
        self.parse_reader(BufReader::new(file))
            .with_context(|| format!("parsing statement {}", path.display()))
    }
}

fn parse_amount(text: &str, row: usize, file: &str) -> Result<Money> {
    text.parse::<Money>()
        .map(Money::abs)
        .with_context(|| format!("bad amount in row {} of {}", row + 1, file))
}
