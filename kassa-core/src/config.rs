//! Tunables for the journal builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One categorization group: a transaction belongs to it when its
/// from/to account matches exactly or its details contain one of the
/// substrings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    #[serde(default)]
    pub substrings: Vec<String>,
    #[serde(default)]
    pub from_accounts: Vec<String>,
    #[serde(default)]
    pub to_accounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// A currency qualifies as a conversion target only if its own
    /// date span covers at least this share of the overall span.
    pub min_currency_timespan_percent: u8,
    /// Largest allowed gap, in days, between consecutive rate
    /// observations of a conversion-target currency.
    pub max_currency_timespan_gaps_days: u32,
    /// Currencies forced into the convertible set regardless of the
    /// thresholds. Must have been seen in the data.
    pub convert_to_currencies: Vec<String>,
    /// When set, every uncategorized transaction lands in a single
    /// "unknown" group instead of a group named after its details.
    pub group_all_unknown_transactions: bool,
    pub groups: BTreeMap<String, GroupSpec>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            min_currency_timespan_percent: 80,
            max_currency_timespan_gaps_days: 30,
            convert_to_currencies: Vec::new(),
            group_all_unknown_transactions: false,
            groups: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.min_currency_timespan_percent, 80);
        assert_eq!(config.max_currency_timespan_gaps_days, 30);
        assert!(config.convert_to_currencies.is_empty());
        assert!(!config.group_all_unknown_transactions);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"min_currency_timespan_percent": 50}"#).unwrap();
        assert_eq!(config.min_currency_timespan_percent, 50);
        assert_eq!(config.max_currency_timespan_gaps_days, 30);
    }
}
