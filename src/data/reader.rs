//! Reading transactions from delimited text with day-first dates.

use crate::core::Transaction;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, instrument};

/// Header names of the columns a transaction is assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub category: String,
    pub sub_category: String,
    pub amount: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "Order Date".to_string(),
            category: "Category".to_string(),
            sub_category: "Sub-Category".to_string(),
            amount: "Sales".to_string(),
        }
    }
}

/// CSV transaction reader.
///
/// # Example
/// ```
/// use stockcast::data::TransactionReader;
///
/// let csv = "Order Date,Category,Sub-Category,Sales\n\
///            05/03/2018,Furniture,Chairs,120.5\n";
/// let transactions = TransactionReader::new().read(csv.as_bytes()).unwrap();
/// assert_eq!(transactions[0].date().to_string(), "2018-03-05");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionReader {
    columns: ColumnMapping,
    delimiter: Option<u8>,
}

struct ColumnIndices {
    date: usize,
    category: usize,
    sub_category: usize,
    amount: usize,
}

impl TransactionReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom header names.
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Use a field delimiter other than `,`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Read every record into a transaction.
    ///
    /// Row numbers in errors count data rows from 1, excluding the header.
    #[instrument(skip_all)]
    pub fn read<R: Read>(&self, reader: R) -> Result<Vec<Transaction>> {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(true).trim(csv::Trim::All);
        if let Some(delimiter) = self.delimiter {
            builder.delimiter(delimiter);
        }
        let mut csv_reader = builder.from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ForecastError::InvalidInput(format!("column '{}' not found", name))
            })
        };
        let idx = ColumnIndices {
            date: find(&self.columns.date)?,
            category: find(&self.columns.category)?,
            sub_category: find(&self.columns.sub_category)?,
            amount: find(&self.columns.amount)?,
        };

        let mut transactions = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let field = |col: usize| record.get(col).unwrap_or("");

            let raw_date = field(idx.date);
            let date = parse_day_first(raw_date).ok_or_else(|| ForecastError::InvalidDate {
                row,
                value: raw_date.to_string(),
            })?;

            let raw_amount = field(idx.amount);
            let amount: f64 = raw_amount.parse().map_err(|_| {
                ForecastError::InvalidInput(format!(
                    "amount '{}' at row {} is not a number",
                    raw_amount, row
                ))
            })?;

            let transaction =
                Transaction::new(date, field(idx.category), field(idx.sub_category), amount)
                    .map_err(|e| match e {
                        ForecastError::InvalidInput(msg) => {
                            ForecastError::InvalidInput(format!("{} (row {})", msg, row))
                        }
                        other => other,
                    })?;
            transactions.push(transaction);
        }

        debug!(rows = transactions.len(), "read transactions");
        Ok(transactions)
    }
}

/// Parse a calendar date, reading ambiguous numeric forms day-first.
///
/// `05/03/2018` is 5 March 2018. `/`, `-` and `.` separators are accepted,
/// two-digit years follow chrono's `%y` pivot, and a leading four-digit
/// year is read as ISO `year-month-day`. A trailing time of day is ignored.
pub fn parse_day_first(input: &str) -> Option<NaiveDate> {
    let date_part = input
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    let sep = date_part.chars().find(|c| matches!(c, '/' | '-' | '.'))?;

    let segments: Vec<&str> = date_part.split(sep).collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let format = if segments[0].len() == 4 {
        format!("%Y{sep}%m{sep}%d")
    } else if segments[2].len() == 2 {
        format!("%d{sep}%m{sep}%y")
    } else if segments[2].len() == 4 {
        format!("%d{sep}%m{sep}%Y")
    } else {
        return None;
    };

    NaiveDate::parse_from_str(date_part, &format).ok()
}
