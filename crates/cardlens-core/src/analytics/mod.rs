//! Spending analytics
//!
//! Every component is a pure function over a borrowed slice of transactions:
//!
//! - **Aggregator** (`aggregate`) - totals, per-group sums, mean, max, mode
//! - **Trend Builder** (`trends`) - monthly/weekly series
//! - **Outlier Detector** (`outliers`) - amounts far from the mean
//! - **Insight Generator** (`insights`) - top categories and recommendations
//! - **Card Analytics** (`cards`) - utilization, recent activity, portfolio
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cardlens_core::analytics::SpendingAnalyzer;
//!
//! let analyzer = SpendingAnalyzer::new();
//! let report = analyzer.spending_report(&transactions);
//! let unusual = analyzer.unusual_transactions(&transactions);
//! ```

pub mod aggregate;
pub mod cards;
pub mod insights;
pub mod outliers;
pub mod periods;
pub mod trends;

pub use aggregate::{spending_report, GroupTotal, GroupTotals};
pub use cards::{
    card_analytics, profile_report, recent_transactions, transactions_for_card, utilization_rate,
};
pub use insights::generate_insights;
pub use outliers::{detect_unusual, find_unusual, mean, sample_std_dev, UnusualTransaction};
pub use periods::{month_end, week_end, Granularity, WEEK_END_DAY};
pub use trends::{spending_series, trend_report};

use crate::config::AnalyticsConfig;
use crate::models::{
    CardAnalyticsReport, CardSummary, InsightReport, ProfileReport, SpendingReport, Transaction,
    TrendReport,
};

/// Runs every analysis with one shared configuration
#[derive(Debug, Clone, Default)]
pub struct SpendingAnalyzer {
    config: AnalyticsConfig,
}

impl SpendingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn spending_report(&self, transactions: &[Transaction]) -> SpendingReport {
        spending_report(transactions, &self.config)
    }

    pub fn trend_report(&self, transactions: &[Transaction]) -> TrendReport {
        trend_report(transactions, &self.config)
    }

    pub fn unusual_transactions(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        detect_unusual(transactions, &self.config)
    }

    /// Unusual transactions with their input position and z-score
    pub fn unusual_with_scores(&self, transactions: &[Transaction]) -> Vec<UnusualTransaction> {
        find_unusual(transactions, &self.config)
    }

    pub fn insights(&self, transactions: &[Transaction]) -> InsightReport {
        generate_insights(transactions, &self.config)
    }

    pub fn card_analytics(
        &self,
        card: &CardSummary,
        transactions: &[Transaction],
    ) -> CardAnalyticsReport {
        card_analytics(card, transactions, &self.config)
    }

    pub fn profile(&self, cards: &[CardSummary], transactions: &[Transaction]) -> ProfileReport {
        profile_report(cards, transactions, &self.config)
    }
}
