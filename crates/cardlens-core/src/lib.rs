//! cardlens Core Library
//!
//! Spending analytics over credit card transactions:
//! - Spending summary (totals, per-category/merchant/day sums, mean, max, mode)
//! - Monthly and weekly trend series
//! - Statistical outlier detection
//! - Ranked categories and plain-language recommendations
//! - Card utilization and portfolio summaries
//! - Statement import from CSV and JSON exports
//! - Layered TOML configuration for every threshold

pub mod analytics;
pub mod config;
pub mod error;
pub mod import;
pub mod models;

pub use analytics::{SpendingAnalyzer, UnusualTransaction};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use import::{load_statement, SignConvention, StatementFormat};
pub use models::{
    CardAnalyticsReport, CardSummary, CategoryAmount, DateRange, InsightReport, ProfileReport,
    SpendingReport, Statement, Transaction, TrendReport,
};
