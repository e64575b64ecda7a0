//! Sales transactions and the category filter applied before aggregation.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Category label that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// One historical sale event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    category: String,
    sub_category: String,
    amount: f64,
}

impl Transaction {
    /// Create a transaction, rejecting negative or non-finite amounts.
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        sub_category: impl Into<String>,
        amount: f64,
    ) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ForecastError::InvalidInput(format!(
                "amount must be a non-negative number, got {}",
                amount
            )));
        }
        Ok(Self {
            date,
            category: category.into(),
            sub_category: sub_category.into(),
            amount,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Category / sub-category selection.
///
/// `category == None` lets every category through. `sub_categories == None`
/// applies no sub-category restriction, while `Some(empty set)` matches
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesFilter {
    category: Option<String>,
    sub_categories: Option<BTreeSet<String>>,
}

impl SalesFilter {
    /// Filter that passes every transaction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from a control-surface selection.
    ///
    /// A category of [`ALL_CATEGORIES`] (any case) or an empty string selects
    /// every category.
    pub fn from_selection<I, S>(category: &str, sub_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let category = category.trim();
        let filter = if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::all()
        } else {
            Self::all().with_category(category)
        };
        filter.with_sub_categories(sub_categories)
    }

    /// Restrict to an exact category name.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a set of sub-categories.
    pub fn with_sub_categories<I, S>(mut self, sub_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_categories = Some(sub_categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn sub_categories(&self) -> Option<&BTreeSet<String>> {
        self.sub_categories.as_ref()
    }

    /// True when the selection can never match a transaction.
    pub fn is_empty_selection(&self) -> bool {
        self.sub_categories.as_ref().is_some_and(|s| s.is_empty())
    }

    /// Check whether a transaction passes the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(category) = &self.category {
            if transaction.category() != category {
                return false;
            }
        }
        match &self.sub_categories {
            Some(subs) => subs.contains(transaction.sub_category()),
            None => true,
        }
    }
}
