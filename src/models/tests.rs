#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::Error;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_expense(day: NaiveDate, amount: Decimal, category: &str, description: Option<&str>) -> Expense {
    Expense {
        id: 1,
        date: day,
        amount,
        category: category.into(),
        description: description.map(str::to_string),
        created_at: String::new(),
    }
}

// ── Period ────────────────────────────────────────────────────

#[test]
fn test_period_parse_and_display() {
    let p: Period = "2024-03".parse().unwrap();
    assert_eq!(p.year(), 2024);
    assert_eq!(p.month(), 3);
    assert_eq!(p.to_string(), "2024-03");
}

#[test]
fn test_period_rejects_bad_input() {
    for bad in ["2024-13", "2024-00", "2024-3", "24-03", "2024/03", "", "abcd-ef"] {
        assert!(bad.parse::<Period>().is_err(), "accepted {bad:?}");
    }
}

#[test]
fn test_period_new_validates_month() {
    assert!(Period::new(2024, 0).is_err());
    assert!(Period::new(2024, 13).is_err());
    assert!(Period::new(2024, 12).is_ok());
}

#[test]
fn test_period_navigation_wraps_year() {
    let dec = Period::new(2023, 12).unwrap();
    assert_eq!(dec.next(), Period::new(2024, 1).unwrap());
    assert_eq!(dec.next().prev(), dec);
}

#[test]
fn test_period_bounds() {
    let feb = Period::new(2024, 2).unwrap();
    assert_eq!(feb.first_day(), date(2024, 2, 1));
    assert_eq!(feb.last_day(), date(2024, 2, 29));
    assert!(feb.contains(date(2024, 2, 29)));
    assert!(!feb.contains(date(2024, 3, 1)));
}

#[test]
fn test_period_of_date() {
    assert_eq!(Period::of(date(2024, 7, 31)).to_string(), "2024-07");
}

#[test]
fn test_period_serde_as_string() {
    let p = Period::new(2024, 5).unwrap();
    assert_eq!(serde_json::to_string(&p).unwrap(), "\"2024-05\"");
    let back: Period = serde_json::from_str("\"2024-05\"").unwrap();
    assert_eq!(back, p);
    assert!(serde_json::from_str::<Period>("\"2024-5\"").is_err());
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_normalize() {
    assert_eq!(Category::normalize_name("  Food ").unwrap(), "food");
    assert_eq!(Category::normalize_name("Bills & Fees").unwrap(), "bills & fees");
}

#[test]
fn test_category_normalize_rejects() {
    assert!(matches!(Category::normalize_name("   "), Err(Error::Validation(_))));
    assert!(Category::normalize_name("-leading").is_err());
    assert!(Category::normalize_name("semi;colon").is_err());
    assert!(Category::normalize_name(&"x".repeat(41)).is_err());
    assert!(Category::normalize_name(&"x".repeat(40)).is_ok());
}

#[test]
fn test_default_categories_are_valid_names() {
    for name in DEFAULT_CATEGORIES {
        assert_eq!(Category::normalize_name(name).unwrap(), *name);
    }
}

// ── NewExpense ────────────────────────────────────────────────

#[test]
fn test_new_expense_validate_normalizes() {
    let new = NewExpense::new("2024-01-15", dec!(12.50), " Food ", Some("  lunch ".into()));
    let valid = new.validate().unwrap();
    assert_eq!(valid.date, date(2024, 1, 15));
    assert_eq!(valid.category, "food");
    assert_eq!(valid.description.as_deref(), Some("lunch"));
}

#[test]
fn test_new_expense_blank_description_is_none() {
    let new = NewExpense::new("2024-01-15", dec!(1), "food", Some("   ".into()));
    assert!(new.validate().unwrap().description.is_none());
}

#[test]
fn test_new_expense_rejects_non_positive_amount() {
    for amount in [dec!(0), dec!(-5.00)] {
        let err = NewExpense::new("2024-01-15", amount, "food", None)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}

#[test]
fn test_new_expense_rejects_fractional_cents() {
    let err = NewExpense::new("2024-01-15", dec!(1.005), "food", None)
        .validate()
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    // Trailing zeros are fine
    assert!(NewExpense::new("2024-01-15", dec!(1.500), "food", None)
        .validate()
        .is_ok());
}

#[test]
fn test_new_expense_rejects_malformed_date() {
    for bad in ["2024-02-30", "15/01/2024", "yesterday", ""] {
        let err = NewExpense::new(bad, dec!(1), "food", None)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid date"), "{bad}: {err}");
    }
}

#[test]
fn test_new_expense_rejects_year_outside_four_digits() {
    for bad in ["10000-01-01", "+10000-01-01", "0000-12-31", "-0001-01-01"] {
        let err = NewExpense::new(bad, dec!(1), "food", None)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{bad}: {err}");
    }
    assert!(NewExpense::new("9999-12-31", dec!(1), "food", None)
        .validate()
        .is_ok());
    assert!(NewExpense::new("0001-01-01", dec!(1), "food", None)
        .validate()
        .is_ok());
}

#[test]
fn test_new_expense_rejects_amount_above_max() {
    let err = NewExpense::new("2024-01-15", dec!(1000000000000.00), "food", None)
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("at most 999999999999.99"), "{err}");
    let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    assert!(NewExpense::new("2024-01-15", huge, "food", None).validate().is_err());
    assert!(NewExpense::new("2024-01-15", dec!(999999999999.99), "food", None)
        .validate()
        .is_ok());
}

#[test]
fn test_new_expense_deserializes_number_or_string_amount() {
    let a: NewExpense =
        serde_json::from_str(r#"{"date":"2024-01-01","amount":12.5,"category":"food"}"#).unwrap();
    let b: NewExpense =
        serde_json::from_str(r#"{"date":"2024-01-01","amount":"12.5","category":"food"}"#).unwrap();
    assert_eq!(a.amount, dec!(12.5));
    assert_eq!(a, b);
    assert!(a.description.is_none());
}

#[test]
fn test_expense_period() {
    let e = make_expense(date(2024, 4, 2), dec!(3), "food", None);
    assert_eq!(e.period().to_string(), "2024-04");
}

#[test]
fn test_new_expense_from_expense() {
    let e = make_expense(date(2024, 4, 2), dec!(3.10), "food", Some("tea"));
    let n = NewExpense::from(&e);
    assert_eq!(n.date, "2024-04-02");
    assert_eq!(n.amount, dec!(3.10));
    assert_eq!(n.description.as_deref(), Some("tea"));
}

// ── Budget ────────────────────────────────────────────────────

#[test]
fn test_budget_validated() {
    let month = Period::new(2024, 1).unwrap();
    let b = Budget::new("Food".into(), month, dec!(500)).validated().unwrap();
    assert_eq!(b.category, "food");
    assert_eq!(b.limit_amount, dec!(500));
    assert!(Budget::new("food".into(), month, Decimal::ZERO).validated().is_ok());
    assert!(Budget::new("food".into(), month, dec!(-1)).validated().is_err());
    let err = Budget::new("food".into(), month, dec!(1000000000000))
        .validated()
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_budget_serializes_month_as_string() {
    let b = Budget::new("food".into(), Period::new(2024, 1).unwrap(), dec!(500.00));
    let json = serde_json::to_value(&b).unwrap();
    assert_eq!(json["month"], "2024-01");
    assert_eq!(json["limit_amount"], "500.00");
}

// ── ExpenseFilter ─────────────────────────────────────────────

#[test]
fn test_filter_validated_rejects_inverted_ranges() {
    let f = ExpenseFilter {
        start: Some(date(2024, 2, 1)),
        end: Some(date(2024, 1, 1)),
        ..Default::default()
    };
    assert!(f.validated().is_err());

    let f = ExpenseFilter {
        min_amount: Some(dec!(10)),
        max_amount: Some(dec!(5)),
        ..Default::default()
    };
    assert!(f.validated().is_err());
}

#[test]
fn test_filter_validated_normalizes() {
    let f = ExpenseFilter {
        category: Some(" FOOD ".into()),
        search: Some("   ".into()),
        ..Default::default()
    }
    .validated()
    .unwrap();
    assert_eq!(f.category.as_deref(), Some("food"));
    assert!(f.search.is_none());
}

#[test]
fn test_filter_matches() {
    let e = make_expense(date(2024, 1, 15), dec!(20), "food", Some("Pizza night"));
    assert!(ExpenseFilter::default().matches(&e));
    assert!(ExpenseFilter::for_month(Period::new(2024, 1).unwrap()).matches(&e));
    assert!(!ExpenseFilter::for_month(Period::new(2024, 2).unwrap()).matches(&e));
    assert!(ExpenseFilter::default().with_category("Food").matches(&e));
    assert!(!ExpenseFilter::default().with_category("health").matches(&e));

    let f = ExpenseFilter {
        search: Some("pizza".into()),
        min_amount: Some(dec!(20)),
        max_amount: Some(dec!(20)),
        ..Default::default()
    };
    assert!(f.matches(&e));

    let f = ExpenseFilter {
        end: Some(date(2024, 1, 14)),
        ..Default::default()
    };
    assert!(!f.matches(&e));
}
