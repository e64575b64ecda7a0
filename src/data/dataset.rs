//! Immutable transaction snapshot with a content fingerprint.

use crate::core::{SalesFilter, Transaction};
use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Fingerprint of a dataset's contents.
///
/// Two datasets with the same transactions in the same order share a
/// snapshot; any added, removed or edited row changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataSnapshot([u8; 32]);

impl DataSnapshot {
    fn of(transactions: &[Transaction]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((transactions.len() as u64).to_le_bytes());
        for t in transactions {
            hasher.update(t.date().num_days_from_ce().to_le_bytes());
            // Length prefixes keep ("ab", "c") apart from ("a", "bc").
            for text in [t.category(), t.sub_category()] {
                hasher.update((text.len() as u64).to_le_bytes());
                hasher.update(text.as_bytes());
            }
            hasher.update(t.amount().to_bits().to_le_bytes());
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }
}

impl fmt::Display for DataSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Shared, read-only set of historical transactions.
///
/// Cloning is cheap; clones share the same rows and snapshot.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    transactions: Arc<[Transaction]>,
    snapshot: DataSnapshot,
}

impl SalesDataset {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let snapshot = DataSnapshot::of(&transactions);
        Self {
            transactions: transactions.into(),
            snapshot,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn snapshot(&self) -> DataSnapshot {
        self.snapshot
    }

    /// Latest transaction date across the whole dataset.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(Transaction::date).max()
    }

    /// Sorted distinct category names.
    pub fn categories(&self) -> Vec<String> {
        self.transactions
            .iter()
            .map(|t| t.category())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Sorted distinct sub-categories, optionally within one category.
    pub fn sub_categories(&self, category: Option<&str>) -> Vec<String> {
        self.transactions
            .iter()
            .filter(|t| category.map_or(true, |c| t.category() == c))
            .map(|t| t.sub_category())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Transactions passing a filter.
    pub fn filtered<'a>(
        &'a self,
        filter: &'a SalesFilter,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| filter.matches(t))
    }

    /// Total amount of the transactions passing a filter.
    pub fn total_sales(&self, filter: &SalesFilter) -> f64 {
        self.filtered(filter).map(Transaction::amount).sum()
    }
}

impl From<Vec<Transaction>> for SalesDataset {
    fn from(transactions: Vec<Transaction>) -> Self {
        Self::new(transactions)
    }
}
