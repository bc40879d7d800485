//! Report command implementations

use anyhow::Result;
use cardlens_core::models::{SpendingReport, Transaction, TrendReport};
use cardlens_core::Error;

use super::core::{describe_range, print_json, Session};
use super::truncate;

fn print_header(title: &str, session: &Session) {
    println!();
    println!("{}", title);
    println!(
        "   Statement: {} ({})",
        session.source.display(),
        describe_range(&session.range)
    );
    println!("   ─────────────────────────────────────────────────────────────");
}

/// Merchant, else description, for table rows
fn transaction_label(tx: &Transaction) -> String {
    match tx.merchant.as_deref() {
        Some(merchant) => merchant.to_string(),
        None if !tx.description.is_empty() => tx.description.clone(),
        None => "-".to_string(),
    }
}

fn print_transactions(transactions: &[Transaction]) {
    println!(
        "   {:16} │ {:24} │ {:16} │ {:>10}",
        "Date", "Merchant", "Category", "Amount"
    );
    println!("   ─────────────────┼──────────────────────────┼──────────────────┼───────────");
    for tx in transactions {
        println!(
            "   {:16} │ {:24} │ {:16} │ {:>10.2}",
            tx.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
            truncate(&transaction_label(tx), 24),
            truncate(tx.category.as_deref().unwrap_or("-"), 16),
            tx.amount
        );
    }
}

/// Sorted (name, amount) pairs, largest first
fn by_amount_desc(map: &std::collections::BTreeMap<String, f64>) -> Vec<(&String, f64)> {
    let mut rows: Vec<(&String, f64)> = map.iter().map(|(k, v)| (k, *v)).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows
}

fn print_spending_summary(report: &SpendingReport, count: usize) {
    println!("   Total:    ${:.2} across {} transactions", report.total_spent, count);
    println!("   Average:  ${:.2}", report.average_transaction);
    println!("   Largest:  ${:.2}", report.largest_transaction);
    if !report.most_frequent_merchant.is_empty() {
        println!("   Most frequent merchant: {}", report.most_frequent_merchant);
    }
}

pub fn cmd_spending(session: &Session, json: bool) -> Result<()> {
    let transactions = &session.statement.transactions;
    let report = session.analyzer.spending_report(transactions);

    if json {
        return print_json(&report);
    }

    print_header("📊 Spending Summary", session);
    if transactions.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    print_spending_summary(&report, transactions.len());

    for (title, map) in [
        ("Category", &report.spending_by_category),
        ("Merchant", &report.spending_by_merchant),
    ] {
        println!();
        println!("   {:25} │ {:>10} │ {:>6}", title, "Amount", "%");
        println!("   ──────────────────────────┼────────────┼────────");
        for (name, amount) in by_amount_desc(map) {
            let share = if report.total_spent != 0.0 {
                (amount / report.total_spent) * 100.0
            } else {
                0.0
            };
            println!(
                "   {:25} │ {:>10.2} │ {:>5.1}%",
                truncate(name, 25),
                amount,
                share
            );
        }
    }

    println!();
    println!("   {:12} │ {:>10}", "Day", "Amount");
    println!("   ─────────────┼───────────");
    for (day, amount) in &report.daily_spending {
        println!("   {:12} │ {:>10.2}", day.to_string(), amount);
    }

    Ok(())
}

fn print_monthly(trends: &TrendReport) {
    let max = trends.monthly.values().copied().fold(0.0_f64, f64::max);

    println!("   {:10} │ {:>10} │", "Month", "Amount");
    println!("   ───────────┼────────────┼─────────────────────────");
    for (month, amount) in &trends.monthly {
        let bar_len = if max > 0.0 {
            ((amount / max) * 25.0).max(0.0) as usize
        } else {
            0
        };
        println!(
            "   {:10} │ {:>10.2} │ {}",
            month.format("%Y-%m").to_string(),
            amount,
            "█".repeat(bar_len)
        );
    }
}

pub fn cmd_trends(session: &Session, json: bool) -> Result<()> {
    let trends = session.analyzer.trend_report(&session.statement.transactions);

    if json {
        return print_json(&trends);
    }

    print_header("📈 Spending Trends", session);
    if trends.monthly.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    print_monthly(&trends);

    println!();
    println!("   By category:");
    for (category, series) in &trends.by_category {
        let months: Vec<String> = series
            .iter()
            .map(|(month, amount)| format!("{} ${:.2}", month.format("%Y-%m"), amount))
            .collect();
        println!("   {:20} {}", truncate(category, 20), months.join(", "));
    }

    Ok(())
}

pub fn cmd_unusual(session: &Session, json: bool) -> Result<()> {
    let transactions = &session.statement.transactions;
    let unusual = session.analyzer.unusual_with_scores(transactions);

    if json {
        let flagged: Vec<&Transaction> = unusual.iter().map(|u| &u.transaction).collect();
        return print_json(&flagged);
    }

    print_header("🚨 Unusual Transactions", session);
    println!(
        "   Threshold: {} standard deviations from the mean",
        session.analyzer.config().outlier_std_devs
    );
    println!();

    if unusual.is_empty() {
        println!("   ✅ Nothing unusual in {} transactions.", transactions.len());
        return Ok(());
    }

    println!(
        "   {:>5} │ {:10} │ {:24} │ {:>10} │ {:>6}",
        "#", "Date", "Merchant", "Amount", "z"
    );
    println!("   ──────┼────────────┼──────────────────────────┼────────────┼───────");
    for item in &unusual {
        let tx = &item.transaction;
        println!(
            "   {:>5} │ {:10} │ {:24} │ {:>10.2} │ {:>+6.2}",
            item.index + 1,
            tx.date().to_string(),
            truncate(&transaction_label(tx), 24),
            tx.amount,
            item.z_score
        );
    }

    Ok(())
}

pub fn cmd_insights(session: &Session, json: bool) -> Result<()> {
    let insights = session.analyzer.insights(&session.statement.transactions);

    if json {
        return print_json(&insights);
    }

    print_header("💡 Spending Insights", session);
    if insights.top_categories.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    println!("   Top categories:");
    for (rank, item) in insights.top_categories.iter().enumerate() {
        println!(
            "   {:>2}. {:25} ${:>10.2}",
            rank + 1,
            truncate(&item.category, 25),
            item.amount
        );
    }

    println!();
    println!("   {:12} │ {:>10}", "Week ending", "Amount");
    println!("   ─────────────┼───────────");
    for (week, amount) in &insights.spending_patterns {
        println!("   {:12} │ {:>10.2}", week.to_string(), amount);
    }

    println!();
    if insights.recommendations.is_empty() {
        println!("   ✅ No recommendations. Spending looks balanced.");
    } else {
        println!("   Recommendations:");
        for recommendation in &insights.recommendations {
            println!("   • {}", recommendation);
        }
    }

    Ok(())
}

pub fn cmd_card(session: &Session, selector: &str, json: bool) -> Result<()> {
    let cards = &session.statement.cards;
    let card = match cards.iter().find(|c| c.matches(selector)) {
        Some(card) => card,
        None if cards.is_empty() => {
            return Err(Error::NotFound(format!(
                "No card matching '{}': statement has no card data (use a JSON statement with a cards list)",
                selector
            ))
            .into())
        }
        None => {
            let known: Vec<String> = cards.iter().map(|c| c.label()).collect();
            return Err(Error::NotFound(format!(
                "No card matching '{}' (available: {})",
                selector,
                known.join(", ")
            ))
            .into());
        }
    };

    let transactions =
        cardlens_core::analytics::transactions_for_card(card, &session.statement.transactions);
    let report = session.analyzer.card_analytics(card, &transactions);

    if json {
        return print_json(&report);
    }

    print_header(&format!("💳 {}", card.label()), session);
    println!("   Utilization:      {:.1}%", report.utilization_rate);
    println!("   Balance:          ${:.2}", report.total_balance);
    println!("   Available credit: ${:.2}", report.available_credit);
    if let Some(due) = report.payment_due_date {
        println!("   Payment due:      {}", due);
    }
    if let Some(minimum) = report.minimum_payment {
        println!("   Minimum payment:  ${:.2}", minimum);
    }

    println!();
    if report.recent_transactions.is_empty() {
        println!("   No transactions on this card.");
        return Ok(());
    }
    println!("   Recent transactions:");
    print_transactions(&report.recent_transactions);

    println!();
    print_monthly(&report.spending_trends);

    Ok(())
}

pub fn cmd_profile(session: &Session, json: bool) -> Result<()> {
    let transactions = &session.statement.transactions;
    let profile = session
        .analyzer
        .profile(&session.statement.cards, transactions);

    if json {
        return print_json(&profile);
    }

    print_header("👤 Profile", session);
    println!("   Cards:              {}", profile.number_of_cards);
    println!("   Total credit limit: ${:.2}", profile.total_credit_limit);
    println!("   Total balance:      ${:.2}", profile.total_balance);
    println!("   Utilization:        {:.1}%", profile.overall_utilization);

    if !profile.cards.is_empty() {
        println!();
        println!(
            "   {:20} │ {:>10} │ {:>10} │ {:>10}",
            "Card", "Limit", "Balance", "Available"
        );
        println!("   ─────────────────────┼────────────┼────────────┼───────────");
        for card in &profile.cards {
            println!(
                "   {:20} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
                truncate(&card.label(), 20),
                card.credit_limit,
                card.current_balance,
                card.available_credit
            );
        }
    }

    println!();
    if transactions.is_empty() {
        println!("   No transactions found.");
    } else {
        print_spending_summary(&profile.spending_summary, transactions.len());
    }

    Ok(())
}
