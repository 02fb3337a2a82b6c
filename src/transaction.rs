use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Largest amount a single transaction may record.
pub const MAX_AMOUNT: Decimal = Decimal::ONE_THOUSAND;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("amount must be greater than 0 and at most 1000: {0}")]
    InvalidAmount(Decimal),
    #[error("amount is not an exact decimal: {0}")]
    UnparsableAmount(String),
    #[error("unknown category: {0}")]
    InvalidCategory(String),
    #[error("invalid datetime: {0}")]
    InvalidDatetime(String),
}

/// Spending category of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Travel,
    Bills,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Travel => "travel",
            Category::Bills => "bills",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| TransactionError::InvalidCategory(s.to_string()))
    }
}

/// A single expense. Immutable once constructed; equality is by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    amount: Decimal,
    category: Category,
    timestamp: DateTime<FixedOffset>,
}

impl Transaction {
    pub fn new(
        amount: Decimal,
        category: Category,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<Self, TransactionError> {
        if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
            return Err(TransactionError::InvalidAmount(amount));
        }
        Ok(Self {
            amount,
            category,
            timestamp,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

/// Input root for transaction JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionInput {
    pub transactions: Vec<TransactionRecord>,
}

/// Serialized form of a transaction, as found in JSON and CSV input files
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    /// Amount spent, greater than 0 and at most 1000. Read digit for digit,
    /// never through a float.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// One of food, travel, bills, entertainment, other (case-insensitive)
    pub category: String,
    /// When the expense happened (RFC3339 with offset; date-only assumes UTC)
    pub timestamp: String,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = TransactionError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let category = record.category.parse()?;
        let timestamp = parse_datetime(&record.timestamp)?;
        Transaction::new(record.amount, category, timestamp)
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            category: tx.category.to_string(),
            timestamp: tx.timestamp.to_rfc3339(),
        }
    }
}

/// A CSV row, kept as text so the amount is parsed exactly.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    amount: String,
    category: String,
    timestamp: String,
}

impl TryFrom<CsvRecord> for Transaction {
    type Error = TransactionError;

    fn try_from(row: CsvRecord) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str_exact(row.amount.trim())
            .map_err(|_| TransactionError::UnparsableAmount(row.amount.clone()))?;
        Transaction::try_from(TransactionRecord {
            amount,
            category: row.category,
            timestamp: row.timestamp,
        })
    }
}

/// Column names of the CSV input format, in order
pub const CSV_COLUMNS: &[&str] = &["amount", "category", "timestamp"];

/// Read transactions from JSON, keeping file order
pub fn read_transactions_json<R: Read>(reader: R) -> anyhow::Result<Vec<Transaction>> {
    let input: TransactionInput = serde_json::from_reader(reader)?;
    let transactions = input
        .transactions
        .into_iter()
        .map(Transaction::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(transactions)
}

/// Read transactions from CSV, keeping file order
pub fn read_transactions_csv<R: Read>(reader: R) -> anyhow::Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut transactions = Vec::new();
    for record in rdr.deserialize::<CsvRecord>() {
        transactions.push(Transaction::try_from(record?)?);
    }
    log::info!("Read {} csv records", transactions.len());
    Ok(transactions)
}

pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, TransactionError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc().fixed_offset());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().fixed_offset());
    }
    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.and_utc().fixed_offset());
    }
    Err(TransactionError::InvalidDatetime(s.to_string()))
}
