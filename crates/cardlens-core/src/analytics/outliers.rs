//! Statistical outlier detection on transaction amounts

use serde::Serialize;
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::models::Transaction;

/// A flagged transaction together with where it sat in the input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusualTransaction {
    /// Position in the input sequence
    pub index: usize,
    /// Signed distance from the mean in sample standard deviations
    pub z_score: f64,
    pub transaction: Transaction,
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor n - 1), `None` below two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Flag transactions more than `outlier_std_devs` sample deviations from the
/// mean amount, in input order
///
/// Each record is tagged with its position before filtering, so two
/// transactions sharing amount and timestamp are never confused.
pub fn find_unusual(
    transactions: &[Transaction],
    config: &AnalyticsConfig,
) -> Vec<UnusualTransaction> {
    let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();

    let (Some(mu), Some(sigma)) = (mean(&amounts), sample_std_dev(&amounts)) else {
        debug!(
            "Outlier detection skipped: {} transactions is too few",
            transactions.len()
        );
        return Vec::new();
    };

    let cutoff = config.outlier_std_devs * sigma;
    let unusual: Vec<UnusualTransaction> = transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| (tx.amount - mu).abs() > cutoff)
        .map(|(index, tx)| UnusualTransaction {
            index,
            z_score: if sigma > 0.0 {
                (tx.amount - mu) / sigma
            } else {
                0.0
            },
            transaction: tx.clone(),
        })
        .collect();

    debug!(
        "Outlier detection: mean={:.2} sd={:.2} cutoff={:.2}, {} of {} flagged",
        mu,
        sigma,
        cutoff,
        unusual.len(),
        transactions.len()
    );

    unusual
}

/// The unusual transactions themselves, in input order
pub fn detect_unusual(transactions: &[Transaction], config: &AnalyticsConfig) -> Vec<Transaction> {
    find_unusual(transactions, config)
        .into_iter()
        .map(|u| u.transaction)
        .collect()
}
