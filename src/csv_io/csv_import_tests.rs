#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("-42.99").unwrap(), dec!(-42.99));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("-$99.99").unwrap(), dec!(-99.99));
}

#[test]
fn test_parse_decimal_parentheses_negative() {
    assert_eq!(parse_decimal("(500.00)").unwrap(), dec!(-500.00));
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_empty_is_an_error() {
    assert!(parse_decimal("").is_err());
    assert!(parse_decimal("  ").is_err());
}

#[test]
fn test_parse_decimal_invalid() {
    let err = parse_decimal("not_a_number").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    for s in ["2024-01-15", "01/15/2024", "01-15-2024", "01/15/24", "15/01/2024"] {
        assert_eq!(parse_date(s).unwrap(), expected, "{s}");
    }
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("not-a-date").is_err());
    assert!(parse_date("").is_err());
}

// ── Columns ───────────────────────────────────────────────────

#[test]
fn test_columns_by_header_name() {
    let headers = csv::StringRecord::from(vec!["Description", "Category", "AMOUNT", "id", "Date"]);
    let cols = Columns::from_headers(&headers).unwrap();
    assert_eq!(
        cols,
        Columns {
            date: 4,
            amount: 2,
            category: 1,
            description: Some(0),
        }
    );
}

#[test]
fn test_columns_missing_required() {
    let headers = csv::StringRecord::from(vec!["date", "amount", "description"]);
    let err = Columns::from_headers(&headers).unwrap_err();
    assert!(err.to_string().contains("'category'"));
}

// ── CsvImporter::read ─────────────────────────────────────────

#[test]
fn test_read_basic_rows() {
    let csv = "date,amount,category,description\n2024-01-15,4.50,food,Coffee\n01/16/2024,\"$1,200.00\",household,\n";
    let expenses = CsvImporter::read(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].date, "2024-01-15");
    assert_eq!(expenses[0].amount, dec!(4.50));
    assert_eq!(expenses[0].description.as_deref(), Some("Coffee"));
    assert_eq!(expenses[1].date, "2024-01-16");
    assert_eq!(expenses[1].amount, dec!(1200.00));
    assert_eq!(expenses[1].category, "household");
    assert!(expenses[1].description.is_none());
}

#[test]
fn test_read_without_description_column() {
    let csv = "Date,Amount,Category\n2024-01-15,4.50,food\n";
    let expenses = CsvImporter::read(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 1);
    assert!(expenses[0].description.is_none());
}

#[test]
fn test_read_skips_blank_rows() {
    let csv = "date,amount,category\n2024-01-15,4.50,food\n,,\n2024-01-16,1,food\n";
    let expenses = CsvImporter::read(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 2);
}

#[test]
fn test_read_quoted_fields() {
    let csv = "date,amount,category,description\n2024-01-15,4.50,food,\"Coffee, \"\"large\"\"\"\n";
    let expenses = CsvImporter::read(csv.as_bytes()).unwrap();
    assert_eq!(expenses[0].description.as_deref(), Some("Coffee, \"large\""));
}

#[test]
fn test_read_reports_row_number() {
    let csv = "date,amount,category\n2024-01-15,4.50,food\nbad-date,1,food\n";
    let err = CsvImporter::read(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().starts_with("Row 2:"), "{err}");
}

#[test]
fn test_read_empty_input() {
    assert!(CsvImporter::read("".as_bytes()).is_err());
}

#[test]
fn test_read_header_only() {
    let expenses = CsvImporter::read("date,amount,category\n".as_bytes()).unwrap();
    assert!(expenses.is_empty());
}

#[test]
fn test_read_path() {
    let file = make_csv_file("date,amount,category\n2024-01-15,4.50,food\n");
    let expenses = CsvImporter::read_path(file.path()).unwrap();
    assert_eq!(expenses.len(), 1);
}

#[test]
fn test_read_path_missing_file() {
    let err = CsvImporter::read_path(Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
