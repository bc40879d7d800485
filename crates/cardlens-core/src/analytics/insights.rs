//! Ranked categories, weekly pattern and plain-language recommendations

use std::collections::BTreeMap;

use tracing::debug;

use super::aggregate::{category_totals, named_merchant_totals, GroupTotal};
use super::periods::Granularity;
use super::trends::spending_series;
use crate::config::AnalyticsConfig;
use crate::models::{CategoryAmount, InsightReport, Transaction};

/// Build the insight report for a set of transactions
pub fn generate_insights(transactions: &[Transaction], config: &AnalyticsConfig) -> InsightReport {
    if transactions.is_empty() {
        return InsightReport::default();
    }

    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    let ranked = category_totals(transactions, config).ranked();

    let top_categories = ranked
        .iter()
        .take(config.top_categories_limit)
        .map(|(category, group)| CategoryAmount {
            category: category.to_string(),
            amount: group.amount,
        })
        .collect();

    let mut recommendations = category_recommendations(&ranked, total, config);
    recommendations.extend(merchant_recommendations(transactions, config));

    debug!(
        "Insights: {} categories ranked, {} recommendations",
        ranked.len(),
        recommendations.len()
    );

    InsightReport {
        top_categories,
        spending_patterns: spending_series(transactions, Granularity::Weekly),
        recommendations,
    }
}

/// Whole cents, so share comparisons are exact
fn to_cents(amount: f64) -> i128 {
    (amount * 100.0).round() as i128
}

/// Categories whose share of total spend exceeds the threshold, largest first
///
/// The comparison runs on whole cents against the threshold in hundredths of
/// a percent: `category / total > threshold / 100` becomes
/// `category_cents * 10_000 > threshold_bp * total_cents`.
fn category_recommendations(
    ranked: &[(&str, GroupTotal)],
    total: f64,
    config: &AnalyticsConfig,
) -> Vec<String> {
    let total_cents = to_cents(total);
    // A share of a non-positive total has no meaning
    if total_cents <= 0 {
        return Vec::new();
    }
    let threshold_bp = to_cents(config.category_share_threshold);

    ranked
        .iter()
        .filter_map(|(category, group)| {
            let exceeds = to_cents(group.amount) * 10_000 > threshold_bp * total_cents;
            let percentage = (group.amount / total) * 100.0;
            exceeds.then(|| {
                format!(
                    "Consider reducing spending in {} category (currently {:.1}% of total spending)",
                    category, percentage
                )
            })
        })
        .collect()
}

/// Merchants visited more often than the threshold, by merchant name
fn merchant_recommendations(transactions: &[Transaction], config: &AnalyticsConfig) -> Vec<String> {
    let merchants = named_merchant_totals(transactions);
    let by_name: BTreeMap<&str, GroupTotal> = merchants.iter().collect();

    by_name
        .into_iter()
        .filter(|(_, group)| group.count > config.frequent_merchant_min_count)
        .map(|(merchant, group)| {
            format!(
                "You frequently shop at {} (${:.2} total). Consider looking for deals or alternatives.",
                merchant, group.amount
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::tx;
    use chrono::NaiveDate;

    fn categorized(amounts: &[(&str, f64)]) -> Vec<Transaction> {
        amounts
            .iter()
            .map(|(category, amount)| tx(*amount, "2024-06-03T10:00:00", Some(category), None))
            .collect()
    }

    #[test]
    fn test_empty() {
        let report = generate_insights(&[], &AnalyticsConfig::default());
        assert!(report.top_categories.is_empty());
        assert!(report.spending_patterns.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_top_categories_limit_and_order() {
        let txs = categorized(&[
            ("A", 10.0),
            ("B", 60.0),
            ("C", 30.0),
            ("D", 30.0),
            ("E", 5.0),
            ("F", 1.0),
            ("B", 5.0),
        ]);
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        let names: Vec<&str> = report
            .top_categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        // C and D tie; C was seen first
        assert_eq!(names, vec!["B", "C", "D", "A", "E"]);
        assert_eq!(report.top_categories[0].amount, 65.0);
    }

    #[test]
    fn test_exactly_thirty_percent_not_flagged() {
        let txs = categorized(&[("Dining", 30.0), ("Rent", 35.0), ("Travel", 35.0)]);
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations.iter().all(|r| !r.contains("Dining")));
    }

    #[test]
    fn test_exactly_thirty_percent_of_cents_not_flagged() {
        // 0.30 + 0.57 + 0.13 sums to just under 1.00 in f64
        let txs = categorized(&[("Dining", 0.30), ("Rent", 0.57), ("Travel", 0.13)]);
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        assert_eq!(
            report.recommendations,
            vec![
                "Consider reducing spending in Rent category (currently 57.0% of total spending)"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_just_over_thirty_percent_flagged() {
        let txs = categorized(&[("Dining", 30.1), ("Rent", 34.9), ("Travel", 35.0)]);
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(
            report.recommendations[2],
            "Consider reducing spending in Dining category (currently 30.1% of total spending)"
        );
        // Largest share first
        assert!(report.recommendations[0].contains("Travel"));
    }

    #[test]
    fn test_frequent_merchant_needs_more_than_five() {
        let mut txs = Vec::new();
        for day in 1..=5 {
            txs.push(tx(
                4.0,
                &format!("2024-06-{:02}T08:00:00", day),
                Some("Coffee"),
                Some("Bean Bar"),
            ));
        }
        for day in 1..=6 {
            txs.push(tx(
                2.5,
                &format!("2024-06-{:02}T09:00:00", day),
                Some("Coffee"),
                Some("Daily Grind"),
            ));
        }
        // Anonymous transactions never count toward a merchant
        for day in 1..=7 {
            txs.push(tx(0.5, &format!("2024-06-{:02}T10:00:00", day), Some("Coffee"), None));
        }

        let config = AnalyticsConfig {
            // Keep the category rule out of the way
            category_share_threshold: 100.0,
            ..Default::default()
        };
        let report = generate_insights(&txs, &config);
        assert_eq!(
            report.recommendations,
            vec![
                "You frequently shop at Daily Grind ($15.00 total). Consider looking for deals or alternatives."
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_category_rules_precede_merchant_rules() {
        let mut txs = Vec::new();
        for merchant in ["Zoo Mart", "Alpha Foods"] {
            for day in 1..=6 {
                txs.push(tx(
                    10.0,
                    &format!("2024-06-{:02}T12:00:00", day),
                    Some("Groceries"),
                    Some(merchant),
                ));
            }
        }
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations[0].starts_with("Consider reducing spending in Groceries"));
        assert!(report.recommendations[0].contains("100.0%"));
        // Merchant rules follow merchant name order
        assert!(report.recommendations[1].contains("Alpha Foods ($60.00 total)"));
        assert!(report.recommendations[2].contains("Zoo Mart ($60.00 total)"));
    }

    #[test]
    fn test_no_category_rule_for_non_positive_total() {
        let txs = categorized(&[("Refunds", -50.0), ("Dining", 20.0)]);
        let report = generate_insights(&txs, &AnalyticsConfig::default());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_spending_patterns_weekly() {
        let txs = vec![
            tx(5.0, "2024-06-03T10:00:00", None, None),  // Monday
            tx(6.0, "2024-06-09T10:00:00", None, None),  // Sunday, same week
            tx(7.0, "2024-06-24T10:00:00", None, None),  // two weeks later
        ];
        let report = generate_insights(&txs, &AnalyticsConfig::default());

        let sunday = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        assert_eq!(report.spending_patterns.len(), 4);
        assert_eq!(report.spending_patterns[&sunday(9)], 11.0);
        assert_eq!(report.spending_patterns[&sunday(16)], 0.0);
        assert_eq!(report.spending_patterns[&sunday(23)], 0.0);
        assert_eq!(report.spending_patterns[&sunday(30)], 7.0);
    }
}
