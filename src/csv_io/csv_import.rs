use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::NewExpense;

/// Date formats accepted on import, tried in order. Two-digit years go first
/// since `%Y` would otherwise read "24" as year 24.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y"];

/// Column positions resolved from a CSV header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Columns {
    date: usize,
    amount: usize,
    category: usize,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::validation(format!("CSV is missing a '{name}' column")))
        };
        Ok(Self {
            date: require("date")?,
            amount: require("amount")?,
            category: require("category")?,
            description: find("description"),
        })
    }
}

pub struct CsvImporter;

impl CsvImporter {
    pub fn read_path(path: &Path) -> Result<Vec<NewExpense>> {
        let file = std::fs::File::open(path)?;
        Self::read(file)
    }

    /// Parse a CSV with a header row into unvalidated expenses.
    ///
    /// Columns are matched by header name; blank rows are skipped. Dates are
    /// re-emitted as `YYYY-MM-DD` so the store sees one format.
    pub fn read<R: Read>(reader: R) -> Result<Vec<NewExpense>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(Error::validation("CSV file is empty"));
        }
        let columns = Columns::from_headers(&headers)?;

        let mut expenses = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let field = |idx: usize| record.get(idx).unwrap_or("");
            let row_error = |e: Error| match e {
                Error::Validation(msg) => Error::Validation(format!("Row {}: {msg}", i + 1)),
                other => other,
            };

            let date = parse_date(field(columns.date)).map_err(row_error)?;
            let amount = parse_decimal(field(columns.amount)).map_err(row_error)?;
            let description = columns
                .description
                .map(field)
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            expenses.push(NewExpense::new(
                date.format("%Y-%m-%d").to_string(),
                amount,
                field(columns.category),
                description,
            ));
        }

        Ok(expenses)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::validation(format!("Could not parse date '{s}'")))
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ','], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Err(Error::validation("Amount is missing"));
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_str(&cleaned.replace('"', "")))
        .map_err(|_| Error::validation(format!("Failed to parse '{s}' as an amount")))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
