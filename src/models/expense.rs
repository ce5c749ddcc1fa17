use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, Period};

const MAX_DESCRIPTION_CHARS: usize = 500;
/// 999,999,999,999.99. Sums of many such amounts stay far from `Decimal::MAX`.
const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// A stored expense. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl Expense {
    pub fn period(&self) -> Period {
        Period::of(self.date)
    }
}

/// An expense as submitted by a user, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A `NewExpense` whose fields have been checked and normalised.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidExpense {
    pub(crate) date: NaiveDate,
    pub(crate) amount: Decimal,
    pub(crate) category: String,
    pub(crate) description: Option<String>,
}

impl NewExpense {
    pub fn new(
        date: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            category: category.into(),
            description,
        }
    }

    /// Checks everything that doesn't need the store. Whether the category
    /// exists is checked on insert.
    pub(crate) fn validate(&self) -> Result<ValidExpense> {
        let date = parse_iso_date(&self.date)?;
        validate_money(self.amount, "Amount")?;
        if self.amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        let category = Category::normalize_name(&self.category)?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS)
        {
            return Err(Error::validation(format!(
                "Description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(ValidExpense {
            date,
            amount: self.amount,
            category,
            description,
        })
    }
}

impl From<&Expense> for NewExpense {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date.format("%Y-%m-%d").to_string(),
            amount: expense.amount,
            category: expense.category.clone(),
            description: expense.description.clone(),
        }
    }
}

fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let invalid = || Error::validation(format!("Invalid date '{s}': expected YYYY-MM-DD"));
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
    // Periods only cover years 1..=9999
    if !(1..=9999).contains(&date.year()) {
        return Err(invalid());
    }
    Ok(date)
}

/// Money has at most two fractional digits and is bounded by `MAX_MONEY`.
pub(crate) fn validate_money(amount: Decimal, field: &str) -> Result<()> {
    if amount.normalize().scale() > 2 {
        return Err(Error::validation(format!(
            "{field} must have at most 2 decimal places"
        )));
    }
    if amount.abs() > MAX_MONEY {
        return Err(Error::validation(format!(
            "{field} must be at most {MAX_MONEY}"
        )));
    }
    Ok(())
}
