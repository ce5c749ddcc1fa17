mod schema;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::*;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying schema migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for name in DEFAULT_CATEGORIES {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                params![name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn insert_category(&self, raw_name: &str) -> Result<Category> {
        let name = Category::normalize_name(raw_name)?;
        if category_exists(&self.conn, &name)? {
            return Err(Error::Conflict(format!("Category '{name}' already exists")));
        }
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
        Ok(Category {
            id: Some(self.conn.last_insert_rowid()),
            name,
        })
    }

    // ── Expenses ──────────────────────────────────────────────

    pub fn insert_expense(&self, new: &NewExpense) -> Result<Expense> {
        let valid = new.validate()?;
        require_category(&self.conn, &valid.category)?;
        insert_valid_expense(&self.conn, valid)
    }

    /// Insert all expenses or none of them.
    pub fn insert_expenses_batch(&mut self, expenses: &[NewExpense]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for (i, new) in expenses.iter().enumerate() {
            let valid = new
                .validate()
                .and_then(|v| require_category(&tx, &v.category).map(|_| v))
                .map_err(|e| match e {
                    Error::Validation(msg) => Error::Validation(format!("Row {}: {msg}", i + 1)),
                    other => other,
                })?;
            insert_valid_expense(&tx, valid)?;
        }
        tx.commit()?;
        Ok(expenses.len())
    }

    /// Run `f` in one transaction. Nothing it wrote is kept if it fails.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, date, amount, category, description, created_at
                 FROM expenses WHERE id = ?1",
                params![id],
                row_to_expense,
            )
            .optional()?)
    }

    /// Returns false when no expense had that id.
    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    pub fn get_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let filter = filter.validated()?;
        let mut sql = String::from(
            "SELECT id, date, amount, category, description, created_at
             FROM expenses WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(start) = filter.start {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = filter.end {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(end.format("%Y-%m-%d").to_string()));
        }
        if let Some(month) = filter.month {
            sql.push_str(&format!(" AND date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{month}-%")));
        }
        if let Some(category) = filter.category.clone() {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category));
        }
        if let Some(s) = filter.search.as_deref() {
            sql.push_str(&format!(
                " AND description LIKE ?{} ESCAPE '\\'",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{}%", escape_like(s))));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        // Amounts are TEXT, so amount bounds are applied on Decimal values and
        // paging has to follow them.
        let by_amount = filter.min_amount.is_some() || filter.max_amount.is_some();
        if !by_amount {
            match (filter.limit, filter.offset) {
                (Some(l), Some(o)) => sql.push_str(&format!(" LIMIT {l} OFFSET {o}")),
                (Some(l), None) => sql.push_str(&format!(" LIMIT {l}")),
                (None, Some(o)) => sql.push_str(&format!(" LIMIT -1 OFFSET {o}")),
                (None, None) => {}
            }
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), row_to_expense)?;
        let expenses = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        if !by_amount {
            return Ok(expenses);
        }

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(expenses
            .into_iter()
            .filter(|e| filter.matches(e))
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub fn get_expenses_for_period(&self, month: Period) -> Result<Vec<Expense>> {
        self.get_expenses(&ExpenseFilter::for_month(month))
    }

    pub fn get_expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        self.get_expenses(&ExpenseFilter {
            start: Some(start),
            end: Some(end),
            ..ExpenseFilter::default()
        })
    }

    pub fn get_expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub fn get_budgets(&self, month: Option<Period>) -> Result<Vec<Budget>> {
        let (sql, param_values): (&str, Vec<String>) = match month {
            Some(m) => (
                "SELECT category, month, limit_amount FROM budgets
                 WHERE month = ?1 ORDER BY month, category",
                vec![m.to_string()],
            ),
            None => (
                "SELECT category, month, limit_amount FROM budgets ORDER BY month, category",
                vec![],
            ),
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(param_values), row_to_budget)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_budget(&self, category: &str, month: Period) -> Result<Option<Budget>> {
        let category = Category::normalize_name(category)?;
        Ok(self
            .conn
            .query_row(
                "SELECT category, month, limit_amount FROM budgets
                 WHERE category = ?1 AND month = ?2",
                params![category, month.to_string()],
                row_to_budget,
            )
            .optional()?)
    }

    /// Create or replace the budget for (category, month).
    pub fn upsert_budget(&self, budget: &Budget) -> Result<Budget> {
        let budget = budget.validated()?;
        require_category(&self.conn, &budget.category)?;
        self.conn.execute(
            "INSERT INTO budgets (category, month, limit_amount)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(category, month) DO UPDATE SET limit_amount = excluded.limit_amount",
            params![
                budget.category,
                budget.month.to_string(),
                budget.limit_amount.to_string(),
            ],
        )?;
        Ok(budget)
    }

    /// Returns false when there was no such budget.
    pub fn delete_budget(&self, category: &str, month: Period) -> Result<bool> {
        let category = Category::normalize_name(category)?;
        let deleted = self.conn.execute(
            "DELETE FROM budgets WHERE category = ?1 AND month = ?2",
            params![category, month.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

fn category_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
        params![name],
        |row| row.get(0),
    )?)
}

fn require_category(conn: &Connection, name: &str) -> Result<()> {
    if category_exists(conn, name)? {
        Ok(())
    } else {
        Err(Error::validation(format!("Unknown category '{name}'")))
    }
}

fn insert_valid_expense(conn: &Connection, valid: ValidExpense) -> Result<Expense> {
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO expenses (date, amount, category, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            valid.date.format("%Y-%m-%d").to_string(),
            valid.amount.to_string(),
            valid.category,
            valid.description,
            created_at,
        ],
    )?;
    Ok(Expense {
        id: conn.last_insert_rowid(),
        date: valid.date,
        amount: valid.amount,
        category: valid.category,
        description: valid.description,
        created_at,
    })
}

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let date: String = row.get(1)?;
    let amount: String = row.get(2)?;
    Ok(Expense {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| conversion_error(1, e))?,
        amount: Decimal::from_str(&amount).map_err(|e| conversion_error(2, e))?,
        category: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    let month: String = row.get(1)?;
    let limit: String = row.get(2)?;
    Ok(Budget {
        category: row.get(0)?,
        month: Period::from_str(&month).map_err(|e| conversion_error(1, e))?,
        limit_amount: Decimal::from_str(&limit).map_err(|e| conversion_error(2, e))?,
    })
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Escape `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
