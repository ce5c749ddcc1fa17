use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Category, Expense, Period};

const MAX_LIMIT: u32 = 10_000;

/// Criteria for listing expenses. Every field is optional; an empty filter
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpenseFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub month: Option<Period>,
    pub category: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ExpenseFilter {
    pub fn for_month(month: Period) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Normalise the category and reject contradictory bounds.
    pub(crate) fn validated(&self) -> Result<Self> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::validation("start must not be after end"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(Error::validation("min_amount must not exceed max_amount"));
            }
        }
        if self.limit.is_some_and(|l| l > MAX_LIMIT) {
            return Err(Error::validation(format!("limit must be at most {MAX_LIMIT}")));
        }
        let category = self
            .category
            .as_deref()
            .map(Category::normalize_name)
            .transpose()?;
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Self {
            category,
            search,
            ..self.clone()
        })
    }

    /// In-memory equivalent of the SQL filter, ignoring paging.
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.start.is_some_and(|s| expense.date < s) {
            return false;
        }
        if self.end.is_some_and(|e| expense.date > e) {
            return false;
        }
        if self.month.is_some_and(|m| !m.contains(expense.date)) {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|c| !expense.category.eq_ignore_ascii_case(c.trim()))
        {
            return false;
        }
        if self.min_amount.is_some_and(|m| expense.amount < m) {
            return false;
        }
        if self.max_amount.is_some_and(|m| expense.amount > m) {
            return false;
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = expense
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}
