//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cardlens - Spending analytics for credit card statements
#[derive(Parser)]
#[command(name = "cardlens")]
#[command(about = "Spending analytics for credit card statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Statement file (CSV or JSON)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Statement format: csv, json (detected from the extension if not specified)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Amounts in the file are negative for purchases
    ///
    /// Most bank CSV exports write purchases as negative numbers.
    /// This flag flips them so spending is positive.
    #[arg(long, global = true)]
    pub spend_negative: bool,

    /// Analytics config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only include transactions on or after this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<String>,

    /// Only include transactions on or before this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub to: Option<String>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Spending summary: totals and per-category, merchant and day sums
    Spending,

    /// Monthly spending and per-category monthly series
    Trends,

    /// Transactions far from the mean amount
    Unusual,

    /// Top categories, weekly patterns and recommendations
    Insights,

    /// Utilization, recent activity and trends for one card
    Card {
        /// Card id or last four digits
        #[arg(short, long)]
        card: String,
    },

    /// Totals across every card in the statement
    Profile,

    /// Show the effective analytics configuration
    Config,
}
