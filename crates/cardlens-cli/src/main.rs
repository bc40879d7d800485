//! cardlens CLI - Spending analytics for credit card statements
//!
//! Usage:
//!   cardlens --file march.csv --spend-negative spending
//!   cardlens --file statement.json trends --json
//!   cardlens --file statement.json card --card 4242
//!   cardlens config

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let input = commands::InputOptions {
        file: cli.file.as_deref(),
        format: cli.format.as_deref(),
        spend_negative: cli.spend_negative,
        config: cli.config.as_deref(),
        from: cli.from.as_deref(),
        to: cli.to.as_deref(),
    };
    let session = || commands::load_session(&input);

    match cli.command {
        Commands::Spending => commands::cmd_spending(&session()?, cli.json),
        Commands::Trends => commands::cmd_trends(&session()?, cli.json),
        Commands::Unusual => commands::cmd_unusual(&session()?, cli.json),
        Commands::Insights => commands::cmd_insights(&session()?, cli.json),
        Commands::Card { ref card } => commands::cmd_card(&session()?, card, cli.json),
        Commands::Profile => commands::cmd_profile(&session()?, cli.json),
        Commands::Config => commands::cmd_config(cli.config.as_deref(), cli.json),
    }
}
