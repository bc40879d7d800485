//! Statement import from CSV and JSON exports

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{timestamp, Statement, Transaction};

/// Supported statement file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    Csv,
    Json,
}

impl StatementFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::str::FromStr for StatementFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown statement format: {} (valid: csv, json)", s)),
        }
    }
}

impl std::fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the source file signs its amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignConvention {
    /// Purchases positive, refunds negative (the analytics convention)
    #[default]
    SpendPositive,
    /// Purchases negative, as most bank CSV exports write them
    SpendNegative,
}

impl SignConvention {
    fn normalize(&self, amount: f64) -> f64 {
        match self {
            Self::SpendPositive => amount,
            Self::SpendNegative => -amount,
        }
    }
}

/// Load a statement file, detecting the format from its extension unless given
pub fn load_statement(
    path: &Path,
    format: Option<StatementFormat>,
    convention: SignConvention,
) -> Result<Statement> {
    let format = match format.or_else(|| StatementFormat::from_path(path)) {
        Some(format) => format,
        None => {
            return Err(Error::UnsupportedFormat(format!(
                "Cannot infer format of {} (use csv or json)",
                path.display()
            )))
        }
    };

    let reader = BufReader::new(File::open(path)?);
    let statement = match format {
        StatementFormat::Json => parse_json(reader, convention)?,
        StatementFormat::Csv => Statement {
            cards: Vec::new(),
            transactions: parse_csv(reader, convention)?,
        },
    };

    if statement.transactions.is_empty() {
        warn!("No transactions found in {}", path.display());
    }

    info!(
        "Loaded {} transactions and {} cards from {}",
        statement.transactions.len(),
        statement.cards.len(),
        path.display()
    );
    Ok(statement)
}

/// Parse a JSON statement: a bare transaction array or `{cards, transactions}`
pub fn parse_json<R: Read>(reader: R, convention: SignConvention) -> Result<Statement> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;

    let mut statement = if value.is_array() {
        Statement {
            cards: Vec::new(),
            transactions: serde_json::from_value(value)?,
        }
    } else {
        serde_json::from_value::<Statement>(value)?
    };

    for tx in &mut statement.transactions {
        tx.amount = convention.normalize(tx.amount);
    }
    validate_statement(&statement)?;

    debug!(
        "Parsed JSON statement: {} transactions, {} cards",
        statement.transactions.len(),
        statement.cards.len()
    );
    Ok(statement)
}

/// Column positions resolved from the CSV header
struct Columns {
    date: usize,
    amount: usize,
    description: Option<usize>,
    category: Option<usize>,
    merchant: Option<usize>,
    post_date: Option<usize>,
    transaction_type: Option<usize>,
    location: Option<usize>,
    id: Option<usize>,
    card_id: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header(h), i))
            .collect();
        let find = |names: &[&str]| names.iter().find_map(|n| index.get(*n).copied());

        let date = find(&["transaction_date", "transactiondate", "date"])
            .ok_or_else(|| Error::Import("Missing date column".into()))?;
        let amount =
            find(&["amount"]).ok_or_else(|| Error::Import("Missing amount column".into()))?;

        Ok(Self {
            date,
            amount,
            description: find(&["description", "memo"]),
            category: find(&["category"]),
            merchant: find(&["merchant", "merchant_name"]),
            post_date: find(&["post_date", "postdate", "posted_date"]),
            transaction_type: find(&["transaction_type", "type"]),
            location: find(&["location"]),
            id: find(&["id", "transaction_id", "reference"]),
            card_id: find(&["card_id", "cardid", "card"]),
        })
    }
}

/// "Transaction Date" -> "transaction_date"
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse a header-driven CSV export into transactions
pub fn parse_csv<R: Read>(reader: R, convention: SignConvention) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = i + 2;

        let cell = |col: Option<usize>| -> Option<String> {
            col.and_then(|c| record.get(c))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };

        let date_str = record
            .get(columns.date)
            .ok_or_else(|| Error::Import(format!("Line {}: missing date", line)))?;
        let transaction_date = timestamp::parse(date_str).ok_or_else(|| {
            Error::Import(format!("Line {}: unable to parse date: {}", line, date_str))
        })?;

        let amount_str = record
            .get(columns.amount)
            .ok_or_else(|| Error::Import(format!("Line {}: missing amount", line)))?;
        let amount = parse_amount(amount_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let post_date = match cell(columns.post_date) {
            Some(raw) => Some(timestamp::parse(&raw).ok_or_else(|| {
                Error::Import(format!("Line {}: unable to parse post date: {}", line, raw))
            })?),
            None => None,
        };

        transactions.push(Transaction {
            id: cell(columns.id),
            card_id: cell(columns.card_id),
            amount: convention.normalize(amount),
            category: cell(columns.category),
            merchant: cell(columns.merchant),
            transaction_date,
            post_date,
            description: cell(columns.description).unwrap_or_default(),
            transaction_type: cell(columns.transaction_type),
            location: cell(columns.location),
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))?;

    if !amount.is_finite() {
        return Err(Error::InvalidData(format!("Amount is not finite: {}", s)));
    }
    Ok(amount)
}

/// Reject records the analytics cannot aggregate
pub fn validate_statement(statement: &Statement) -> Result<()> {
    for (i, tx) in statement.transactions.iter().enumerate() {
        if !tx.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Transaction {} has a non-finite amount",
                i
            )));
        }
    }
    for card in &statement.cards {
        let values = [card.credit_limit, card.current_balance, card.available_credit];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Card {} has a non-finite balance or limit",
                card.label()
            )));
        }
    }
    Ok(())
}
