//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_session` - Shared utility to load config and statement
//! - `parse_date_arg` - `--from` / `--to` parsing
//! - `print_json` - `--json` output
//! - `cmd_config` - Show the effective analytics configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cardlens_core::config::default_config_path;
use cardlens_core::{
    load_statement, AnalyticsConfig, DateRange, SignConvention, SpendingAnalyzer, Statement,
    StatementFormat,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Global flags that select and filter the statement
#[derive(Debug, Default, Clone, Copy)]
pub struct InputOptions<'a> {
    pub file: Option<&'a Path>,
    pub format: Option<&'a str>,
    pub spend_negative: bool,
    pub config: Option<&'a Path>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

/// A loaded statement plus the analyzer configured for it
pub struct Session {
    pub source: PathBuf,
    pub range: DateRange,
    pub statement: Statement,
    pub analyzer: SpendingAnalyzer,
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
        })
        .transpose()
}

/// Load config and statement, then apply the date range
pub fn load_session(input: &InputOptions<'_>) -> Result<Session> {
    let file = input
        .file
        .context("No statement file given (use --file <PATH>)")?;

    let config = AnalyticsConfig::load(input.config).context("Failed to load analytics config")?;

    let format = input
        .format
        .map(str::parse::<StatementFormat>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let convention = if input.spend_negative {
        SignConvention::SpendNegative
    } else {
        SignConvention::SpendPositive
    };

    let range = DateRange::from_dates(
        parse_date_arg(input.from, "--from")?,
        parse_date_arg(input.to, "--to")?,
    )
    .context("Invalid date range")?;

    let mut statement = load_statement(file, format, convention)
        .with_context(|| format!("Failed to load statement {}", file.display()))?;

    if !range.is_unbounded() {
        let before = statement.transactions.len();
        statement.transactions = range.apply(&statement.transactions);
        debug!(
            "Date range kept {} of {} transactions",
            statement.transactions.len(),
            before
        );
    }

    Ok(Session {
        source: file.to_path_buf(),
        range,
        statement,
        analyzer: SpendingAnalyzer::with_config(config),
    })
}

/// Print a report as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

/// "2024-01-01 to 2024-01-31", "from 2024-01-01", "all dates"
pub fn describe_range(range: &DateRange) -> String {
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!("{} to {}", start.date(), end.date()),
        (Some(start), None) => format!("from {}", start.date()),
        (None, Some(end)) => format!("through {}", end.date()),
        (None, None) => "all dates".to_string(),
    }
}

pub fn cmd_config(override_path: Option<&Path>, json: bool) -> Result<()> {
    let config = AnalyticsConfig::load(override_path).context("Failed to load analytics config")?;

    if json {
        return print_json(&config);
    }

    let source = match override_path {
        Some(path) => path.display().to_string(),
        None => match default_config_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    println!();
    println!("⚙️  Analytics Configuration");
    println!("   Source: {}", source);
    println!("   ─────────────────────────────────────────────");
    println!("   {:32} {}", "Outlier threshold (std devs)", config.outlier_std_devs);
    println!("   {:32} {}", "Top categories", config.top_categories_limit);
    println!(
        "   {:32} {:.1}%",
        "Category share threshold", config.category_share_threshold
    );
    println!(
        "   {:32} > {}",
        "Frequent merchant visits", config.frequent_merchant_min_count
    );
    println!("   {:32} {}", "Recent transactions", config.recent_transactions_limit);
    println!("   {:32} {}", "Uncategorized label", config.uncategorized_label);
    println!("   {:32} {}", "Unknown merchant label", config.unknown_merchant_label);

    if override_path.is_none() {
        if let Some(path) = default_config_path() {
            println!();
            println!("   💡 Override with {}", path.display());
        }
    }

    Ok(())
}
