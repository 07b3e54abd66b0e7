//! Rate table and rate provider abstractions

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Snapshot of exchange rates relative to a single base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: String,
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new(base: &str, rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        RateTable {
            base: base.to_string(),
            rates: rates.into_iter().collect(),
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Currency codes in the table, sorted.
    pub fn currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the current rate table for `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currencies_are_sorted() {
        let table = RateTable::new(
            "USD",
            vec![
                ("JPY".to_string(), 150.2),
                ("EUR".to_string(), 0.9),
                ("USD".to_string(), 1.0),
            ],
        );

        assert_eq!(table.currencies(), vec!["EUR", "JPY", "USD"]);
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.rate("GBP"), None);
        assert_eq!(table.len(), 3);
    }
}
