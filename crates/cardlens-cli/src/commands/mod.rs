//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Statement loading, date arguments and the `config` command
//! - `reports` - Report commands (spending, trends, unusual, insights, card, profile)

pub mod core;
pub mod reports;

// Re-export command functions for main.rs
pub use core::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
