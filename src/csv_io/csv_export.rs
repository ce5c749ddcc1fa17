use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Expense;

pub(crate) const HEADER: [&str; 5] = ["id", "date", "amount", "category", "description"];

/// Write expenses as CSV with a header row. Returns the number of rows written.
pub fn write_expenses<W: Write>(writer: W, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for e in expenses {
        wtr.write_record([
            e.id.to_string(),
            e.date.format("%Y-%m-%d").to_string(),
            e.amount.to_string(),
            e.category.clone(),
            e.description.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(expenses.len())
}

pub fn export_to_string(expenses: &[Expense]) -> Result<String> {
    let mut buf = Vec::new();
    write_expenses(&mut buf, expenses)?;
    String::from_utf8(buf)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn export_to_path(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_expenses(std::io::BufWriter::new(file), expenses)
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
