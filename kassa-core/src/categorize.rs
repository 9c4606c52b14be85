//! Rule-based transaction categorization.
//!
//! Priority: exact from-account match, exact to-account match, then
//! the longest substring of the details text present in the rule trie.
//! The trie walks Unicode code points, so Armenian and Cyrillic
//! statement text matches the same way ASCII does.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::GroupSpec;
use crate::error::{KassaError, Result};
use crate::transaction::Transaction;

/// Which rule produced a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRule {
    FromAccount,
    ToAccount,
    Substring,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub group: String,
    pub rule: MatchRule,
    /// The account number or substring that matched; empty for
    /// unmatched transactions.
    pub value: String,
    pub uncategorized: bool,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, usize>,
    /// Group owning the substring terminating here.
    terminal: Option<String>,
}

#[derive(Debug)]
pub struct Categorizer {
    nodes: Vec<TrieNode>,
    from_accounts: HashMap<String, String>,
    to_accounts: HashMap<String, String>,
    group_unknowns: bool,
}

impl Categorizer {
    pub fn from_groups(
        groups: &BTreeMap<String, GroupSpec>,
        group_unknowns: bool,
    ) -> Result<Self> {
        let mut categorizer = Categorizer {
            nodes: vec![TrieNode::default()],
            from_accounts: HashMap::new(),
            to_accounts: HashMap::new(),
            group_unknowns,
        };

        for (group, spec) in groups {
            for substring in &spec.substrings {
                categorizer.insert_substring(substring, group)?;
            }
            for account in &spec.from_accounts {
                insert_account(&mut categorizer.from_accounts, account, group, "from_accounts")?;
            }
            for account in &spec.to_accounts {
                insert_account(&mut categorizer.to_accounts, account, group, "to_accounts")?;
            }
        }
        Ok(categorizer)
    }

    fn insert_substring(&mut self, substring: &str, group: &str) -> Result<()> {
        if substring.is_empty() {
            return Err(KassaError::Config(format!(
                "group {group:?} contains an empty substring"
            )));
        }
        let mut node = 0;
        for c in substring.chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        if let Some(existing) = &self.nodes[node].terminal {
            return Err(KassaError::Config(format!(
                "substring {substring:?} duplicated in groups {existing:?} and {group:?}"
            )));
        }
        self.nodes[node].terminal = Some(group.to_string());
        Ok(())
    }

    /// Classify one transaction. Fails only on empty details, which a
    /// valid parser never produces.
    pub fn classify(&self, tx: &Transaction) -> Result<CategoryMatch> {
        if tx.details.is_empty() {
            return Err(KassaError::Validation {
                context: tx.describe(),
                reason: "empty details".to_string(),
            });
        }

        if !tx.from_account.is_empty() {
            if let Some(group) = self.from_accounts.get(&tx.from_account) {
                return Ok(CategoryMatch {
                    group: group.clone(),
                    rule: MatchRule::FromAccount,
                    value: tx.from_account.clone(),
                    uncategorized: false,
                });
            }
        }
        if !tx.to_account.is_empty() {
            if let Some(group) = self.to_accounts.get(&tx.to_account) {
                return Ok(CategoryMatch {
                    group: group.clone(),
                    rule: MatchRule::ToAccount,
                    value: tx.to_account.clone(),
                    uncategorized: false,
                });
            }
        }

        if let Some((group, value)) = self.longest_match(&tx.details) {
            return Ok(CategoryMatch {
                group,
                rule: MatchRule::Substring,
                value,
                uncategorized: false,
            });
        }

        let group = if self.group_unknowns {
            "unknown".to_string()
        } else {
            tx.details.clone()
        };
        Ok(CategoryMatch {
            group,
            rule: MatchRule::Unmatched,
            value: String::new(),
            uncategorized: true,
        })
    }

    /// The longest substring of `details` marked in the trie, with its
    /// group. Ties across start offsets resolve to the earliest one.
    fn longest_match(&self, details: &str) -> Option<(String, String)> {
        let chars: Vec<char> = details.chars().collect();
        let mut best: Option<(usize, usize, usize)> = None; // (len, start, node)

        for start in 0..chars.len() {
            let mut node = 0;
            let mut depth = 0;
            for &c in &chars[start..] {
                match self.nodes[node].children.get(&c) {
                    Some(&next) => {
                        node = next;
                        depth += 1;
                        if self.nodes[node].terminal.is_some()
                            && best.map_or(true, |(len, _, _)| depth > len)
                        {
                            best = Some((depth, start, node));
                        }
                    }
                    None => break,
                }
            }
        }

        best.map(|(len, start, node)| {
            let group = self.nodes[node]
                .terminal
                .clone()
                .unwrap_or_default();
            let value: String = chars[start..start + len].iter().collect();
            (group, value)
        })
    }
}

fn insert_account(
    index: &mut HashMap<String, String>,
    account: &str,
    group: &str,
    kind: &str,
) -> Result<()> {
    if let Some(existing) = index.get(account) {
        return Err(KassaError::Config(format!(
            "account {account:?} duplicated in {kind} of groups {existing:?} and {group:?}"
        )));
    }
    index.insert(account.to_string(), group.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::transaction::Source;
    use chrono::NaiveDate;

    fn groups(entries: &[(&str, &[&str], &[&str], &[&str])]) -> BTreeMap<String, GroupSpec> {
        entries
            .iter()
            .map(|(name, subs, from, to)| {
                (
                    name.to_string(),
                    GroupSpec {
                        substrings: subs.iter().map(|s| s.to_string()).collect(),
                        from_accounts: from.iter().map(|s| s.to_string()).collect(),
                        to_accounts: to.iter().map(|s| s.to_string()).collect(),
                    },
                )
            })
            .collect()
    }

    fn tx(details: &str, from_account: &str, to_account: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_expense: true,
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            details: details.to_string(),
            account_currency: "AMD".to_string(),
            amount: Money::from_cents(1_000),
            origin_currency: String::new(),
            origin_amount: Money::ZERO,
            source: Source::default(),
        }
    }

    #[test]
    fn test_account_match_beats_substring() {
        let groups = groups(&[
            ("Cafes", &["Coffee"], &[], &[]),
            ("Salary", &[], &["ACC1"], &[]),
        ]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let result = categorizer.classify(&tx("Coffee at XYZ", "ACC1", "")).unwrap();
        assert_eq!(result.group, "Salary");
        assert_eq!(result.rule, MatchRule::FromAccount);
        assert_eq!(result.value, "ACC1");
    }

    #[test]
    fn test_to_account_after_from_account() {
        let groups = groups(&[("Rent", &[], &[], &["LANDLORD9"])]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let result = categorizer
            .classify(&tx("Monthly transfer", "OTHER", "LANDLORD9"))
            .unwrap();
        assert_eq!(result.group, "Rent");
        assert_eq!(result.rule, MatchRule::ToAccount);
    }

    #[test]
    fn test_longest_substring_wins() {
        let groups = groups(&[
            ("Shopping", &["Yandex"], &[], &[]),
            ("Transport", &["Yandex Taxi"], &[], &[]),
        ]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let result = categorizer.classify(&tx("Yandex Taxi", "", "")).unwrap();
        assert_eq!(result.group, "Transport");
        assert_eq!(result.rule, MatchRule::Substring);
        assert_eq!(result.value, "Yandex Taxi");
    }

    #[test]
    fn test_longest_match_anywhere_in_details() {
        let groups = groups(&[
            ("Short", &["ab"], &[], &[]),
            ("Long", &["bcd"], &[], &[]),
        ]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let result = categorizer.classify(&tx("xxabcdxx", "", "")).unwrap();
        assert_eq!(result.group, "Long");
        assert_eq!(result.value, "bcd");
    }

    #[test]
    fn test_multibyte_details_match() {
        let groups = groups(&[("Groceries", &["Սուպերմարկետ"], &[], &[])]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let result = categorizer
            .classify(&tx("Գնումներ Սուպերմարկետ Երևան", "", ""))
            .unwrap();
        assert_eq!(result.group, "Groceries");
        assert_eq!(result.value, "Սուպերմարկետ");
    }

    #[test]
    fn test_unmatched_falls_back_to_details_or_unknown() {
        let groups = groups(&[("Cafes", &["Coffee"], &[], &[])]);

        let keep = Categorizer::from_groups(&groups, false).unwrap();
        let result = keep.classify(&tx("Mystery payment", "", "")).unwrap();
        assert_eq!(result.group, "Mystery payment");
        assert!(result.uncategorized);
        assert_eq!(result.rule, MatchRule::Unmatched);

        let grouped = Categorizer::from_groups(&groups, true).unwrap();
        let result = grouped.classify(&tx("Mystery payment", "", "")).unwrap();
        assert_eq!(result.group, "unknown");
        assert!(result.uncategorized);
    }

    #[test]
    fn test_duplicate_substring_names_both_groups() {
        let groups = groups(&[
            ("Alpha", &["Coffee"], &[], &[]),
            ("Beta", &["Coffee"], &[], &[]),
        ]);
        let err = Categorizer::from_groups(&groups, false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Alpha") && message.contains("Beta"), "{message}");
        assert!(message.contains("Coffee"));
    }

    #[test]
    fn test_duplicate_account_is_config_error() {
        let groups = groups(&[
            ("Alpha", &[], &["ACC1"], &[]),
            ("Beta", &[], &["ACC1"], &[]),
        ]);
        assert!(matches!(
            Categorizer::from_groups(&groups, false),
            Err(KassaError::Config(_))
        ));
    }

    #[test]
    fn test_empty_details_is_validation_error() {
        let groups = groups(&[("Cafes", &["Coffee"], &[], &[])]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        assert!(matches!(
            categorizer.classify(&tx("", "", "")),
            Err(KassaError::Validation { .. })
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let groups = groups(&[
            ("Shopping", &["Yandex"], &[], &[]),
            ("Transport", &["Yandex Taxi"], &[], &[]),
        ]);
        let categorizer = Categorizer::from_groups(&groups, false).unwrap();
        let a = categorizer.classify(&tx("Yandex Taxi home", "", "")).unwrap();
        let b = categorizer.classify(&tx("Yandex Taxi home", "", "")).unwrap();
        assert_eq!(a, b);
    }
}
