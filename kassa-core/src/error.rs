//! Error taxonomy for the journal core.
//!
//! Configuration and validation problems abort the run with the first
//! error encountered; rate sniffing and missing direct observations are
//! best-effort and never surface here.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KassaError {
    /// Build-time configuration problems: duplicate categorization
    /// rules, force-convert currencies absent from the data, an empty
    /// convertible set.
    #[error("configuration error: {0}")]
    Config(String),

    /// A transaction violating the normalized-input invariants.
    #[error("invalid transaction ({context}): {reason}")]
    Validation { context: String, reason: String },

    /// A currency code failing the expected shape.
    #[error("invalid currency code {code:?} ({context})")]
    CurrencyCode { code: String, context: String },

    /// A money string that does not parse as a decimal amount.
    #[error("cannot parse money amount {0:?}")]
    MoneyParse(String),

    /// A non-probe transaction whose every conversion came out zero.
    #[error(
        "transaction {date} {details:?} cannot be converted to {currency}, \
         not enough exchange-rate evidence"
    )]
    Conversion {
        date: NaiveDate,
        details: String,
        currency: String,
    },
}

pub type Result<T> = std::result::Result<T, KassaError>;
