//! Card utilization and portfolio summaries

use tracing::debug;

use super::aggregate::spending_report;
use super::trends::trend_report;
use crate::config::AnalyticsConfig;
use crate::models::{CardAnalyticsReport, CardSummary, ProfileReport, Transaction};

/// Balance as a percentage of the limit; 0 when the limit is not positive
pub fn utilization_rate(current_balance: f64, credit_limit: f64) -> f64 {
    if credit_limit > 0.0 {
        (current_balance / credit_limit) * 100.0
    } else {
        0.0
    }
}

/// Most recent transactions first, at most `limit`
///
/// Transactions with the same timestamp keep their input order.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
    sorted.into_iter().take(limit).cloned().collect()
}

/// Transactions charged to `card`
///
/// Falls back to every transaction when the card has no id or no
/// transaction carries a card id, since the caller then handed over a
/// single card's statement.
pub fn transactions_for_card(card: &CardSummary, transactions: &[Transaction]) -> Vec<Transaction> {
    let tagged = transactions.iter().any(|t| t.card_id.is_some());
    match (&card.id, tagged) {
        (Some(id), true) => transactions
            .iter()
            .filter(|t| t.card_id.as_ref() == Some(id))
            .cloned()
            .collect(),
        _ => transactions.to_vec(),
    }
}

/// Utilization, recent activity and monthly trends for one card
pub fn card_analytics(
    card: &CardSummary,
    transactions: &[Transaction],
    config: &AnalyticsConfig,
) -> CardAnalyticsReport {
    let utilization = utilization_rate(card.current_balance, card.credit_limit);
    debug!(
        "Card analytics for {}: {} transactions, utilization {:.1}%",
        card.label(),
        transactions.len(),
        utilization
    );

    CardAnalyticsReport {
        utilization_rate: utilization,
        available_credit: card.available_credit,
        total_balance: card.current_balance,
        payment_due_date: None,
        minimum_payment: None,
        recent_transactions: recent_transactions(transactions, config.recent_transactions_limit),
        spending_trends: trend_report(transactions, config),
    }
}

/// Totals across every card plus the spending summary of all transactions
pub fn profile_report(
    cards: &[CardSummary],
    transactions: &[Transaction],
    config: &AnalyticsConfig,
) -> ProfileReport {
    let total_credit_limit: f64 = cards.iter().map(|c| c.credit_limit).sum();
    let total_balance: f64 = cards.iter().map(|c| c.current_balance).sum();

    ProfileReport {
        total_credit_limit,
        total_balance,
        overall_utilization: utilization_rate(total_balance, total_credit_limit),
        number_of_cards: cards.len(),
        spending_summary: spending_report(transactions, config),
        cards: cards.to_vec(),
    }
}
