//! kassa-core: multi-currency journal builder for normalized bank
//! statement transactions.
//!
//! The pipeline: parsers produce [`Transaction`]s, pass 1 validates
//! them and mines exchange-rate observations, the convertibility
//! filter picks conversion targets, and the assembler emits
//! [`JournalEntry`]s carrying a category and the equivalent amount in
//! every convertible currency.

pub mod categorize;
pub mod config;
pub mod convert;
pub mod convertible;
pub mod currency;
pub mod error;
pub mod journal;
pub mod money;
pub mod rates;
pub mod stats;
pub mod transaction;

pub use categorize::{Categorizer, CategoryMatch, MatchRule};
pub use config::{CoreConfig, GroupSpec};
pub use convert::{ConvertedAmount, Converter, PRECISION_UNREACHABLE};
pub use currency::{CurrencyCode, CurrencyStats, RateObservation};
pub use error::{KassaError, Result};
pub use journal::{build_journal, Journal, JournalEntry};
pub use money::Money;
pub use stats::Ledger;
pub use transaction::{Source, Transaction};
