//! kassa-ingest: statement ingestion abstractions and the generic CSV
//! statement parser.

pub mod csv_statement;
pub mod layout;

pub use csv_statement::CsvStatementParser;
pub use layout::CsvLayout;

use std::path::Path;

use anyhow::Result;
use kassa_core::Transaction;

/// Statement parsers are interchangeable behind this interface; the
/// driver picks one per configured statement file. Parsers only
/// normalize rows; all invariant checking happens in the core.
pub trait StatementParser {
    fn parse(&self, path: &Path) -> Result<Vec<Transaction>>;
}
