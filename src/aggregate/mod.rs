//! Spending aggregation and budget-vs-actual classification.
//!
//! Everything above the store-backed section is pure: it takes expenses and
//! budgets and never touches the database.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Budget, Expense, Period};

/// Where a category's spending stands against its budget.
/// Variants are ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    Unbudgeted,
    Ok,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbudgeted => "UNBUDGETED",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Exceeded => "EXCEEDED",
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Warning | Self::Exceeded)
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    /// Fraction of the limit at which a category turns WARNING.
    pub warning_ratio: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_ratio: Decimal::new(80, 2),
        }
    }
}

impl AlertThresholds {
    pub fn from_percent(percent: u32) -> Result<Self> {
        if !(1..=100).contains(&percent) {
            return Err(Error::validation(
                "Warning threshold must be between 1 and 100 percent",
            ));
        }
        Ok(Self {
            warning_ratio: Decimal::new(i64::from(percent), 2),
        })
    }
}

/// Classify spending against an optional limit.
pub fn classify(
    spent: Decimal,
    limit: Option<Decimal>,
    thresholds: &AlertThresholds,
) -> BudgetStatus {
    let Some(limit) = limit else {
        return BudgetStatus::Unbudgeted;
    };
    let warning_at = limit.checked_mul(thresholds.warning_ratio);
    if spent > limit {
        BudgetStatus::Exceeded
    } else if limit > Decimal::ZERO && warning_at.is_some_and(|w| spent >= w) {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub spent: Decimal,
    pub limit: Option<Decimal>,
    /// `spent - limit`; positive means over budget.
    pub delta: Option<Decimal>,
    pub percent_used: Option<Decimal>,
    pub status: BudgetStatus,
    pub expense_count: usize,
}

impl CategorySummary {
    fn new(
        category: String,
        spent: Decimal,
        expense_count: usize,
        limit: Option<Decimal>,
        thresholds: &AlertThresholds,
    ) -> Result<Self> {
        let delta = limit
            .map(|l| spent.checked_sub(l).ok_or_else(overflow))
            .transpose()?;
        let percent_used = match limit {
            Some(l) => percent_of(spent, l)?,
            None => None,
        };
        Ok(Self {
            status: classify(spent, limit, thresholds),
            delta,
            percent_used,
            category,
            spent,
            limit,
            expense_count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub categories: Vec<CategorySummary>,
    pub total_spent: Decimal,
    pub total_budgeted: Decimal,
    /// Spending in categories without a budget for the period.
    pub unbudgeted_spent: Decimal,
    /// Budgeted amount left after spending in budgeted categories.
    pub remaining: Decimal,
    pub percent_used: Option<Decimal>,
}

impl PeriodSummary {
    pub fn category(&self, name: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// Categories at WARNING or worse, most severe first.
    pub fn alerts(&self) -> Vec<&CategorySummary> {
        let mut alerts: Vec<_> = self
            .categories
            .iter()
            .filter(|c| c.status.is_alert())
            .collect();
        alerts.sort_by(|a, b| {
            b.status
                .cmp(&a.status)
                .then_with(|| a.category.cmp(&b.category))
        });
        alerts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: Period,
    pub total: Decimal,
}

/// One row of a category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub categories: Vec<CategoryTotal>,
    pub total: Decimal,
}

fn overflow() -> Error {
    Error::validation("Amount total is too large")
}

fn add(acc: &mut Decimal, amount: Decimal) -> Result<()> {
    *acc = acc.checked_add(amount).ok_or_else(overflow)?;
    Ok(())
}

/// Sum without panicking on overflow.
pub fn checked_sum<I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total = Decimal::ZERO;
    for amount in amounts {
        add(&mut total, amount)?;
    }
    Ok(total)
}

fn percent_of(spent: Decimal, limit: Decimal) -> Result<Option<Decimal>> {
    if limit <= Decimal::ZERO {
        return Ok(None);
    }
    let percent = spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(overflow)?;
    Ok(Some(percent.round_dp(1)))
}

/// Sum amounts per category.
pub fn totals_by_category<'a, I>(expenses: I) -> Result<BTreeMap<String, Decimal>>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = BTreeMap::new();
    for e in expenses {
        add(
            totals.entry(e.category.clone()).or_insert(Decimal::ZERO),
            e.amount,
        )?;
    }
    Ok(totals)
}

/// Sum amounts per calendar month.
pub fn totals_by_month<'a, I>(expenses: I) -> Result<BTreeMap<Period, Decimal>>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = BTreeMap::new();
    for e in expenses {
        add(totals.entry(e.period()).or_insert(Decimal::ZERO), e.amount)?;
    }
    Ok(totals)
}

/// Category totals, largest first, plus their grand total.
pub fn category_breakdown<'a, I>(expenses: I) -> Result<Breakdown>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut categories: Vec<CategoryTotal> = totals_by_category(expenses)?
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    let total = checked_sum(categories.iter().map(|c| c.total))?;
    Ok(Breakdown { categories, total })
}

/// A dense month series of `months` periods ending at `end`, zero-filled.
pub fn month_trend(expenses: &[Expense], end: Period, months: usize) -> Result<Vec<MonthTotal>> {
    let totals = totals_by_month(expenses)?;
    let mut series = Vec::with_capacity(months);
    let mut month = end;
    for _ in 0..months {
        series.push(MonthTotal {
            month,
            total: totals.get(&month).copied().unwrap_or(Decimal::ZERO),
        });
        month = month.prev();
    }
    series.reverse();
    Ok(series)
}

/// Budget-vs-actual for one month.
///
/// Expenses and budgets outside `period` are ignored. Every category that has
/// spending or a budget in the period gets a row, sorted by name.
pub fn summarize(
    period: Period,
    expenses: &[Expense],
    budgets: &[Budget],
    thresholds: &AlertThresholds,
) -> Result<PeriodSummary> {
    let mut spending: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for e in expenses.iter().filter(|e| period.contains(e.date)) {
        let entry = spending
            .entry(e.category.clone())
            .or_insert((Decimal::ZERO, 0));
        add(&mut entry.0, e.amount)?;
        entry.1 += 1;
    }

    let limits: BTreeMap<&str, Decimal> = budgets
        .iter()
        .filter(|b| b.month == period)
        .map(|b| (b.category.as_str(), b.limit_amount))
        .collect();

    let mut names: Vec<&str> = spending.keys().map(String::as_str).collect();
    names.extend(limits.keys().copied());
    names.sort_unstable();
    names.dedup();

    let categories = names
        .into_iter()
        .map(|name| {
            let (spent, count) = spending
                .get(name)
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            CategorySummary::new(
                name.to_string(),
                spent,
                count,
                limits.get(name).copied(),
                thresholds,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let total_spent = checked_sum(categories.iter().map(|c| c.spent))?;
    let total_budgeted = checked_sum(limits.values().copied())?;
    let unbudgeted_spent = checked_sum(
        categories
            .iter()
            .filter(|c| c.limit.is_none())
            .map(|c| c.spent),
    )?;
    let budgeted_spent = total_spent
        .checked_sub(unbudgeted_spent)
        .ok_or_else(overflow)?;
    let remaining = total_budgeted
        .checked_sub(budgeted_spent)
        .ok_or_else(overflow)?;

    Ok(PeriodSummary {
        period,
        categories,
        total_spent,
        total_budgeted,
        unbudgeted_spent,
        remaining,
        percent_used: percent_of(budgeted_spent, total_budgeted)?,
    })
}

// ── Store-backed ──────────────────────────────────────────────

pub fn load_period_summary(
    db: &Database,
    period: Period,
    thresholds: &AlertThresholds,
) -> Result<PeriodSummary> {
    let expenses = db.get_expenses_for_period(period)?;
    let budgets = db.get_budgets(Some(period))?;
    summarize(period, &expenses, &budgets, thresholds)
}

/// The budget position of one category after an expense lands in it.
pub fn load_category_status(
    db: &Database,
    category: &str,
    period: Period,
    thresholds: &AlertThresholds,
) -> Result<CategorySummary> {
    let summary = load_period_summary(db, period, thresholds)?;
    summary
        .category(category)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Category '{category}' in {period}")))
}

pub fn load_month_trend(db: &Database, end: Period, months: usize) -> Result<Vec<MonthTotal>> {
    if months == 0 {
        return Ok(Vec::new());
    }
    let mut start = end;
    for _ in 1..months {
        start = start.prev();
    }
    let expenses = db.get_expenses_between(start.first_day(), end.last_day())?;
    month_trend(&expenses, end, months)
}
