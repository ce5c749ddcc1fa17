use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::expense::validate_money;
use crate::models::{Category, Period};

/// A spending limit for one category over one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub month: Period,
    pub limit_amount: Decimal,
}

impl Budget {
    pub fn new(category: String, month: Period, limit_amount: Decimal) -> Self {
        Self {
            category,
            month,
            limit_amount,
        }
    }

    /// Returns the budget with its category name normalised.
    pub(crate) fn validated(&self) -> Result<Self> {
        if self.limit_amount < Decimal::ZERO {
            return Err(Error::validation("Budget limit must not be negative"));
        }
        validate_money(self.limit_amount, "Budget limit")?;
        Ok(Self {
            category: Category::normalize_name(&self.category)?,
            month: self.month,
            limit_amount: self.limit_amount,
        })
    }
}
