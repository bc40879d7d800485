//! Time-bucketed spending series

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::periods::Granularity;
use crate::config::AnalyticsConfig;
use crate::models::{Transaction, TrendReport};

/// Sum amounts per bucket, with zero-filled gaps between the first and last
/// populated bucket
pub fn spending_series(
    transactions: &[Transaction],
    granularity: Granularity,
) -> BTreeMap<NaiveDate, f64> {
    let series = granularity.fill_gaps(observed_series(transactions.iter(), granularity));
    debug!("{} series: {} buckets", granularity, series.len());
    series
}

/// Sum amounts per bucket, populated buckets only
fn observed_series<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
    granularity: Granularity,
) -> BTreeMap<NaiveDate, f64> {
    let mut series = BTreeMap::new();
    for tx in transactions {
        *series.entry(granularity.bucket(tx.date())).or_insert(0.0) += tx.amount;
    }
    series
}

/// Monthly totals overall and per category
pub fn trend_report(transactions: &[Transaction], config: &AnalyticsConfig) -> TrendReport {
    if transactions.is_empty() {
        return TrendReport::default();
    }

    let monthly = spending_series(transactions, Granularity::Monthly);

    let mut by_category: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for tx in transactions {
        let category = config.category_key(tx.category.as_deref());
        let series = by_category.entry(category.to_string()).or_default();
        *series
            .entry(Granularity::Monthly.bucket(tx.date()))
            .or_insert(0.0) += tx.amount;
    }

    debug!(
        "Trend report: {} months, {} categories",
        monthly.len(),
        by_category.len()
    );

    TrendReport {
        monthly,
        by_category,
    }
}
