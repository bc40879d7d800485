//! Domain models for cardlens
//!
//! Amounts follow a spend-positive convention: purchases are positive,
//! refunds and payment credits are negative.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A card transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier assigned by the card issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Card this transaction was charged to
    #[serde(default, alias = "cardId", skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    /// Positive = spend, negative = refund/credit
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(alias = "transactionDate", deserialize_with = "timestamp::deserialize")]
    pub transaction_date: NaiveDateTime,
    #[serde(
        default,
        alias = "postDate",
        deserialize_with = "timestamp::deserialize_opt"
    )]
    pub post_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "type")]
    pub transaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Transaction {
    /// Minimal transaction with only the fields the analytics read
    pub fn new(amount: f64, transaction_date: NaiveDateTime) -> Self {
        Self {
            id: None,
            card_id: None,
            amount,
            category: None,
            merchant: None,
            transaction_date,
            post_date: None,
            description: String::new(),
            transaction_type: None,
            location: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }

    /// Calendar date of the transaction (time of day discarded)
    pub fn date(&self) -> NaiveDate {
        self.transaction_date.date()
    }
}

/// Balance and limit snapshot for a credit card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "cardNumberLastFour")]
    pub card_number_last_four: Option<String>,
    #[serde(default, alias = "cardType")]
    pub card_type: Option<String>,
    #[serde(default, alias = "expirationDate")]
    pub expiration_date: Option<String>,
    #[serde(alias = "creditLimit")]
    pub credit_limit: f64,
    #[serde(alias = "currentBalance")]
    pub current_balance: f64,
    #[serde(alias = "availableCredit")]
    pub available_credit: f64,
}

impl CardSummary {
    pub fn new(credit_limit: f64, current_balance: f64, available_credit: f64) -> Self {
        Self {
            id: None,
            card_number_last_four: None,
            card_type: None,
            expiration_date: None,
            credit_limit,
            current_balance,
            available_credit,
        }
    }

    /// Short label for display ("Visa ••1234", "card 7", "card")
    pub fn label(&self) -> String {
        match (&self.card_type, &self.card_number_last_four, &self.id) {
            (Some(kind), Some(last4), _) => format!("{} ••{}", kind, last4),
            (None, Some(last4), _) => format!("card ••{}", last4),
            (_, None, Some(id)) => format!("card {}", id),
            _ => "card".to_string(),
        }
    }

    /// Whether a user-supplied selector names this card (id or last four)
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        self.id.as_deref() == Some(selector)
            || self.card_number_last_four.as_deref() == Some(selector)
    }
}

/// A statement: cards plus the transactions charged to them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub cards: Vec<CardSummary>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Inclusive bounds on `transaction_date`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidData(format!(
                    "Date range start {} is after end {}",
                    s, e
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Range covering whole calendar days (start of `from` to end of `to`)
    pub fn from_dates(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        let start = from.and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = to.and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999));
        Self::new(start, end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start.is_none_or(|s| ts >= s) && self.end.is_none_or(|e| ts <= e)
    }

    /// Transactions inside the range, in input order
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.contains(t.transaction_date))
            .cloned()
            .collect()
    }
}

/// Summary metrics over a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingReport {
    pub total_spent: f64,
    pub spending_by_category: BTreeMap<String, f64>,
    pub spending_by_merchant: BTreeMap<String, f64>,
    pub daily_spending: BTreeMap<NaiveDate, f64>,
    pub average_transaction: f64,
    pub largest_transaction: f64,
    /// Empty when no transaction names a merchant
    pub most_frequent_merchant: String,
}

impl SpendingReport {
    pub fn empty() -> Self {
        Self {
            total_spent: 0.0,
            spending_by_category: BTreeMap::new(),
            spending_by_merchant: BTreeMap::new(),
            daily_spending: BTreeMap::new(),
            average_transaction: 0.0,
            largest_transaction: 0.0,
            most_frequent_merchant: String::new(),
        }
    }
}

/// Monthly spending series, keyed by the last day of each month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub monthly: BTreeMap<NaiveDate, f64>,
    pub by_category: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

/// A category and its total spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// Ranked categories, weekly pattern and recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub top_categories: Vec<CategoryAmount>,
    /// Weekly sums keyed by the Sunday that ends each week
    pub spending_patterns: BTreeMap<NaiveDate, f64>,
    pub recommendations: Vec<String>,
}

/// Utilization and activity for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAnalyticsReport {
    /// Percentage of the credit limit in use (0 when the limit is not positive)
    pub utilization_rate: f64,
    pub available_credit: f64,
    pub total_balance: f64,
    /// Supplied by the issuer, never computed here
    pub payment_due_date: Option<NaiveDate>,
    /// Supplied by the issuer, never computed here
    pub minimum_payment: Option<f64>,
    pub recent_transactions: Vec<Transaction>,
    pub spending_trends: TrendReport,
}

/// Portfolio view across every card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub total_credit_limit: f64,
    pub total_balance: f64,
    pub overall_utilization: f64,
    pub number_of_cards: usize,
    pub spending_summary: SpendingReport,
    pub cards: Vec<CardSummary>,
}

/// Timestamp parsing shared by serde and the CSV importer
pub(crate) mod timestamp {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    const DATE_FORMATS: [&str; 3] = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
    ];

    /// Parse a timestamp or a bare date (taken as midnight)
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        // Trailing UTC designator carries no information for naive timestamps
        let s = s.strip_suffix('Z').unwrap_or(s);

        for fmt in DATETIME_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(ts);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
        None
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("Unable to parse timestamp: {}", raw)))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("Unable to parse timestamp: {}", raw))
            }),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            ts("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
        assert_eq!(ts("2024-01-15 10:30:00"), ts("2024-01-15T10:30:00"));
        assert_eq!(ts("2024-01-15T10:30:00Z"), ts("2024-01-15T10:30:00"));
        assert_eq!(ts("2024-01-15"), ts("2024-01-15T00:00:00"));
        assert_eq!(ts("01/15/2024"), ts("2024-01-15T00:00:00"));
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_transaction_deserialize_api_shape() {
        let json = r#"{
            "id": "wf-1",
            "amount": 42.5,
            "description": "COFFEE",
            "transactionDate": "2024-03-02T08:15:00",
            "postDate": "2024-03-03",
            "merchant": "Blue Bottle",
            "type": "purchase"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id.as_deref(), Some("wf-1"));
        assert_eq!(tx.amount, 42.5);
        assert_eq!(tx.category, None);
        assert_eq!(tx.merchant.as_deref(), Some("Blue Bottle"));
        assert_eq!(tx.transaction_type.as_deref(), Some("purchase"));
        assert_eq!(tx.post_date, Some(ts("2024-03-03T00:00:00")));
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_transaction_rejects_bad_timestamp() {
        let json = r#"{"amount": 1.0, "transaction_date": "not a date"}"#;
        let result: std::result::Result<Transaction, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_card_label_and_matching() {
        let mut card = CardSummary::new(1000.0, 250.0, 750.0);
        assert_eq!(card.label(), "card");

        card.id = Some("7".to_string());
        assert_eq!(card.label(), "card 7");

        card.card_number_last_four = Some("1234".to_string());
        card.card_type = Some("Visa".to_string());
        assert_eq!(card.label(), "Visa ••1234");

        assert!(card.matches("7"));
        assert!(card.matches(" 1234 "));
        assert!(!card.matches("9999"));
    }

    #[test]
    fn test_date_range_inclusive() {
        let txs = vec![
            Transaction::new(1.0, ts("2024-01-31T23:59:00")),
            Transaction::new(2.0, ts("2024-02-01T00:00:00")),
            Transaction::new(3.0, ts("2024-02-29T23:59:59")),
            Transaction::new(4.0, ts("2024-03-01T00:00:00")),
        ];
        let range = DateRange::from_dates(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29),
        )
        .unwrap();

        let kept: Vec<f64> = range.apply(&txs).iter().map(|t| t.amount).collect();
        assert_eq!(kept, vec![2.0, 3.0]);

        let open = DateRange::default();
        assert!(open.is_unbounded());
        assert_eq!(open.apply(&txs).len(), 4);
    }

    #[test]
    fn test_date_range_keeps_last_instant_of_day() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_500))
            .unwrap();
        let txs = vec![Transaction::new(5.0, last)];
        let range = DateRange::from_dates(None, NaiveDate::from_ymd_opt(2024, 2, 29)).unwrap();
        assert_eq!(range.apply(&txs).len(), 1);
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let result = DateRange::new(Some(ts("2024-02-01")), Some(ts("2024-01-01")));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }
}
