//! Analytics thresholds
//!
//! Every tunable number the analytics use lives in [`AnalyticsConfig`] so that
//! callers (and tests) can move a boundary without touching the algorithms.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config`), if given and present
//! 2. Override in data dir (~/.local/share/cardlens/config/analytics.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

pub const DEFAULT_OUTLIER_STD_DEVS: f64 = 2.0;
pub const DEFAULT_TOP_CATEGORIES: usize = 5;
pub const DEFAULT_CATEGORY_SHARE_PERCENT: f64 = 30.0;
pub const DEFAULT_FREQUENT_MERCHANT_MIN_COUNT: usize = 5;
pub const DEFAULT_RECENT_TRANSACTIONS: usize = 10;
pub const UNCATEGORIZED: &str = "uncategorized";
pub const UNKNOWN_MERCHANT: &str = "unknown";

/// Thresholds and sentinels used by the analytics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsConfig {
    /// Outlier cutoff, in sample standard deviations from the mean
    pub outlier_std_devs: f64,
    /// How many categories `top_categories` keeps
    pub top_categories_limit: usize,
    /// Share of total spend (percent) a category must exceed to be flagged
    pub category_share_threshold: f64,
    /// Transaction count a merchant must exceed to be flagged
    pub frequent_merchant_min_count: usize,
    /// How many transactions card analytics lists as recent
    pub recent_transactions_limit: usize,
    /// Group key for transactions without a category
    pub uncategorized_label: String,
    /// Group key for transactions without a merchant
    pub unknown_merchant_label: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            outlier_std_devs: DEFAULT_OUTLIER_STD_DEVS,
            top_categories_limit: DEFAULT_TOP_CATEGORIES,
            category_share_threshold: DEFAULT_CATEGORY_SHARE_PERCENT,
            frequent_merchant_min_count: DEFAULT_FREQUENT_MERCHANT_MIN_COUNT,
            recent_transactions_limit: DEFAULT_RECENT_TRANSACTIONS,
            uncategorized_label: UNCATEGORIZED.to_string(),
            unknown_merchant_label: UNKNOWN_MERCHANT.to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Load using the standard resolution order
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Reject thresholds the analytics cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.outlier_std_devs.is_finite() || self.outlier_std_devs < 0.0 {
            return Err(Error::Config(format!(
                "outliers.std_devs must be a non-negative number, got {}",
                self.outlier_std_devs
            )));
        }
        if !self.category_share_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.category_share_threshold)
        {
            return Err(Error::Config(format!(
                "insights.category_share_percent must be between 0 and 100, got {}",
                self.category_share_threshold
            )));
        }
        if self.uncategorized_label.trim().is_empty() {
            return Err(Error::Config("grouping.uncategorized must not be empty".into()));
        }
        if self.unknown_merchant_label.trim().is_empty() {
            return Err(Error::Config(
                "grouping.unknown_merchant must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Category key for a transaction, falling back to the sentinel
    pub fn category_key<'a>(&'a self, category: Option<&'a str>) -> &'a str {
        category.unwrap_or(&self.uncategorized_label)
    }

    /// Merchant key for a transaction, falling back to the sentinel
    pub fn merchant_key<'a>(&'a self, merchant: Option<&'a str>) -> &'a str {
        merchant.unwrap_or(&self.unknown_merchant_label)
    }
}

/// Get the default override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cardlens").join("config").join("analytics.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Loading analytics config from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    outliers: Option<RawOutliers>,
    insights: Option<RawInsights>,
    cards: Option<RawCards>,
    grouping: Option<RawGrouping>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutliers {
    std_devs: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInsights {
    top_categories: Option<usize>,
    category_share_percent: Option<f64>,
    frequent_merchant_min_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCards {
    recent_transactions: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGrouping {
    uncategorized: Option<String>,
    unknown_merchant: Option<String>,
}

/// Parse TOML content, layering present keys over the defaults
pub fn parse_config(content: &str) -> Result<AnalyticsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalyticsConfig::default();

    if let Some(outliers) = raw.outliers {
        if let Some(k) = outliers.std_devs {
            config.outlier_std_devs = k;
        }
    }

    if let Some(insights) = raw.insights {
        if let Some(n) = insights.top_categories {
            config.top_categories_limit = n;
        }
        if let Some(pct) = insights.category_share_percent {
            config.category_share_threshold = pct;
        }
        if let Some(n) = insights.frequent_merchant_min_count {
            config.frequent_merchant_min_count = n;
        }
    }

    if let Some(cards) = raw.cards {
        if let Some(n) = cards.recent_transactions {
            config.recent_transactions_limit = n;
        }
    }

    if let Some(grouping) = raw.grouping {
        if let Some(label) = grouping.uncategorized {
            config.uncategorized_label = label;
        }
        if let Some(label) = grouping.unknown_merchant {
            config.unknown_merchant_label = label;
        }
    }

    config.validate()?;
    Ok(config)
}
