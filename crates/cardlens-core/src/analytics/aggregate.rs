//! Spending summary: totals, per-category/merchant/day sums, mean, max, mode

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::models::{SpendingReport, Transaction};

/// Running sum and count for one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupTotal {
    pub amount: f64,
    pub count: usize,
}

/// Group totals that remember the order keys were first seen in
///
/// Ties in rankings and mode selection are broken by that order, which keeps
/// every report deterministic for a given input sequence.
#[derive(Debug, Default)]
pub struct GroupTotals<'a> {
    order: Vec<&'a str>,
    groups: HashMap<&'a str, GroupTotal>,
}

impl<'a> GroupTotals<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &'a str, amount: f64) {
        let group = self.groups.entry(key).or_insert_with(|| {
            self.order.push(key);
            GroupTotal::default()
        });
        group.amount += amount;
        group.count += 1;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<GroupTotal> {
        self.groups.get(key).copied()
    }

    /// Groups in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, GroupTotal)> + '_ {
        self.order.iter().map(|&key| (key, self.groups[key]))
    }

    /// Groups by descending amount, ties in first-seen order
    pub fn ranked(&self) -> Vec<(&'a str, GroupTotal)> {
        let mut ranked: Vec<_> = self.iter().collect();
        // sort_by is stable, so equal amounts keep first-seen order
        ranked.sort_by(|a, b| b.1.amount.total_cmp(&a.1.amount));
        ranked
    }

    /// Most frequent key, ties in first-seen order
    pub fn mode(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for (key, group) in self.iter() {
            if best.is_none_or(|(_, count)| group.count > count) {
                best = Some((key, group.count));
            }
        }
        best.map(|(key, _)| key)
    }

    pub fn to_amount_map(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(key, group)| (key.to_string(), group.amount))
            .collect()
    }
}

/// Totals per category, missing categories under the configured sentinel
pub fn category_totals<'a>(
    transactions: &'a [Transaction],
    config: &'a AnalyticsConfig,
) -> GroupTotals<'a> {
    let mut totals = GroupTotals::new();
    for tx in transactions {
        totals.add(config.category_key(tx.category.as_deref()), tx.amount);
    }
    totals
}

/// Totals per merchant, missing merchants under the configured sentinel
pub fn merchant_totals<'a>(
    transactions: &'a [Transaction],
    config: &'a AnalyticsConfig,
) -> GroupTotals<'a> {
    let mut totals = GroupTotals::new();
    for tx in transactions {
        totals.add(config.merchant_key(tx.merchant.as_deref()), tx.amount);
    }
    totals
}

/// Totals per merchant, skipping transactions that name no merchant
pub fn named_merchant_totals(transactions: &[Transaction]) -> GroupTotals<'_> {
    let mut totals = GroupTotals::new();
    for tx in transactions {
        if let Some(merchant) = tx.merchant.as_deref() {
            totals.add(merchant, tx.amount);
        }
    }
    totals
}

/// Build the spending summary for a set of transactions
pub fn spending_report(transactions: &[Transaction], config: &AnalyticsConfig) -> SpendingReport {
    if transactions.is_empty() {
        return SpendingReport::empty();
    }

    let total_spent: f64 = transactions.iter().map(|t| t.amount).sum();

    let mut daily_spending = BTreeMap::new();
    for tx in transactions {
        *daily_spending.entry(tx.date()).or_insert(0.0) += tx.amount;
    }

    let largest_transaction = transactions
        .iter()
        .map(|t| t.amount)
        .fold(f64::NEG_INFINITY, f64::max);

    let most_frequent_merchant = named_merchant_totals(transactions)
        .mode()
        .unwrap_or_default()
        .to_string();

    let categories = category_totals(transactions, config);
    let merchants = merchant_totals(transactions, config);

    debug!(
        "Spending report over {} transactions: {} categories, {} merchants, {} days",
        transactions.len(),
        categories.len(),
        merchants.len(),
        daily_spending.len()
    );

    SpendingReport {
        total_spent,
        spending_by_category: categories.to_amount_map(),
        spending_by_merchant: merchants.to_amount_map(),
        daily_spending,
        average_transaction: total_spent / transactions.len() as f64,
        largest_transaction,
        most_frequent_merchant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{at, tx};
    use chrono::NaiveDate;

    fn sample() -> Vec<Transaction> {
        vec![
            tx(12.50, "2024-03-01T08:00:00", Some("Dining"), Some("Cafe Luna")),
            tx(80.00, "2024-03-01T18:30:00", Some("Groceries"), Some("FreshMart")),
            tx(7.25, "2024-03-02T09:10:00", Some("Dining"), Some("Cafe Luna")),
            tx(-20.00, "2024-03-03T12:00:00", Some("Groceries"), Some("FreshMart")),
            tx(45.00, "2024-03-04T10:00:00", None, None),
        ]
    }

    #[test]
    fn test_empty_report() {
        let report = spending_report(&[], &AnalyticsConfig::default());
        assert_eq!(report, SpendingReport::empty());
        assert_eq!(report.most_frequent_merchant, "");
    }

    #[test]
    fn test_totals_and_groups() {
        let config = AnalyticsConfig::default();
        let report = spending_report(&sample(), &config);

        assert!((report.total_spent - 124.75).abs() < 1e-9);
        assert!((report.spending_by_category["Dining"] - 19.75).abs() < 1e-9);
        assert!((report.spending_by_category["Groceries"] - 60.0).abs() < 1e-9);
        assert_eq!(report.spending_by_category["uncategorized"], 45.0);
        assert_eq!(report.spending_by_merchant["unknown"], 45.0);
        assert_eq!(report.spending_by_category.len(), 3);
        assert_eq!(report.spending_by_merchant.len(), 3);
    }

    #[test]
    fn test_group_sums_match_total() {
        let report = spending_report(&sample(), &AnalyticsConfig::default());
        let by_cat: f64 = report.spending_by_category.values().sum();
        let by_merchant: f64 = report.spending_by_merchant.values().sum();
        let by_day: f64 = report.daily_spending.values().sum();
        assert!((by_cat - report.total_spent).abs() < 1e-9);
        assert!((by_merchant - report.total_spent).abs() < 1e-9);
        assert!((by_day - report.total_spent).abs() < 1e-9);
    }

    #[test]
    fn test_daily_discards_time_of_day() {
        let report = spending_report(&sample(), &AnalyticsConfig::default());
        let march_1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!((report.daily_spending[&march_1] - 92.50).abs() < 1e-9);
        assert_eq!(report.daily_spending.len(), 4);
    }

    #[test]
    fn test_average_and_largest() {
        let txs = sample();
        let report = spending_report(&txs, &AnalyticsConfig::default());
        assert_eq!(report.average_transaction, report.total_spent / 5.0);
        assert_eq!(report.largest_transaction, 80.0);
    }

    #[test]
    fn test_largest_is_signed_maximum() {
        let txs = vec![
            tx(-500.0, "2024-01-01T00:00:00", None, None),
            tx(3.0, "2024-01-02T00:00:00", None, None),
        ];
        let report = spending_report(&txs, &AnalyticsConfig::default());
        assert_eq!(report.largest_transaction, 3.0);

        let refunds_only = vec![
            tx(-500.0, "2024-01-01T00:00:00", None, None),
            tx(-3.0, "2024-01-02T00:00:00", None, None),
        ];
        let report = spending_report(&refunds_only, &AnalyticsConfig::default());
        assert_eq!(report.largest_transaction, -3.0);
    }

    #[test]
    fn test_most_frequent_merchant_tie_breaks_first_seen() {
        let txs = vec![
            tx(1.0, "2024-01-01T00:00:00", None, Some("Zed Hardware")),
            tx(1.0, "2024-01-02T00:00:00", None, Some("Acme")),
            tx(1.0, "2024-01-03T00:00:00", None, Some("Acme")),
            tx(1.0, "2024-01-04T00:00:00", None, Some("Zed Hardware")),
        ];
        let report = spending_report(&txs, &AnalyticsConfig::default());
        assert_eq!(report.most_frequent_merchant, "Zed Hardware");
    }

    #[test]
    fn test_most_frequent_ignores_missing_merchants() {
        let txs = vec![
            tx(1.0, "2024-01-01T00:00:00", None, None),
            tx(1.0, "2024-01-02T00:00:00", None, None),
            tx(1.0, "2024-01-03T00:00:00", None, Some("Acme")),
        ];
        let report = spending_report(&txs, &AnalyticsConfig::default());
        assert_eq!(report.most_frequent_merchant, "Acme");

        let anonymous = vec![tx(1.0, "2024-01-01T00:00:00", None, None)];
        let report = spending_report(&anonymous, &AnalyticsConfig::default());
        assert_eq!(report.most_frequent_merchant, "");
    }

    #[test]
    fn test_custom_sentinels() {
        let config = AnalyticsConfig {
            uncategorized_label: "Other".to_string(),
            unknown_merchant_label: "(none)".to_string(),
            ..Default::default()
        };
        let txs = vec![Transaction::new(5.0, at("2024-01-01T00:00:00"))];
        let report = spending_report(&txs, &config);
        assert_eq!(report.spending_by_category["Other"], 5.0);
        assert_eq!(report.spending_by_merchant["(none)"], 5.0);
    }

    #[test]
    fn test_idempotent() {
        let txs = sample();
        let config = AnalyticsConfig::default();
        assert_eq!(spending_report(&txs, &config), spending_report(&txs, &config));
    }

    #[test]
    fn test_group_totals_ranking() {
        let mut totals = GroupTotals::new();
        totals.add("b", 10.0);
        totals.add("a", 30.0);
        totals.add("c", 10.0);
        totals.add("b", 5.0);

        let ranked: Vec<&str> = totals.ranked().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec!["a", "b", "c"]);
        assert_eq!(totals.get("b"), Some(GroupTotal { amount: 15.0, count: 2 }));
        assert_eq!(totals.mode(), Some("b"));
        assert_eq!(GroupTotals::new().mode(), None);
    }
}
