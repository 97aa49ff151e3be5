use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::{CellValue, RawRow, Row, ValidationError};

pub const NAME_REQUIRED: &str = "Name is required";
pub const AMOUNT_REQUIRED: &str = "Amount is required";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be a positive number";
pub const DATE_REQUIRED: &str = "Date is required";
pub const DATE_OUT_OF_WINDOW: &str = "Date must be within the current month";

/// Data rows start under the header and are numbered from 1.
pub const ROW_NUMBER_OFFSET: usize = 2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when `date` falls in the same calendar month and year as `reference`.
/// Both the row validator and the import endpoint gate on this.
pub fn in_month_window(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Serial for 9999-12-31, the last date Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}

fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if s.trim().is_empty() => None,
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
    }
}

fn present<'a>(raw: &'a RawRow, field: &str) -> Option<&'a CellValue> {
    raw.get(field).filter(|c| !matches!(c, CellValue::Text(s) if s.trim().is_empty()))
}

enum AmountCheck {
    Missing,
    Invalid,
    Valid(f64),
}

fn check_amount(cell: Option<&CellValue>) -> AmountCheck {
    let value = match cell {
        None => return AmountCheck::Missing,
        Some(CellValue::Number(n)) => Some(*n),
        Some(CellValue::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(v) if v.is_finite() && v > 0.0 => AmountCheck::Valid(v),
        _ => AmountCheck::Invalid,
    }
}

fn cell_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Bool(_) => None,
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Check one raw row against the import rules. All failing fields are
/// reported; a row with no errors is returned normalized.
pub fn validate(
    raw: &RawRow,
    index: usize,
    sheet_label: &str,
    reference: NaiveDate,
) -> std::result::Result<Row, Vec<ValidationError>> {
    let mut messages: Vec<&str> = Vec::new();

    let name = present(raw, "name").and_then(cell_text);
    if name.is_none() {
        messages.push(NAME_REQUIRED);
    }

    let amount = match check_amount(present(raw, "amount")) {
        AmountCheck::Missing => {
            messages.push(AMOUNT_REQUIRED);
            None
        }
        AmountCheck::Invalid => {
            messages.push(AMOUNT_NOT_POSITIVE);
            None
        }
        AmountCheck::Valid(v) => Some(v),
    };

    let date = match present(raw, "date") {
        None => {
            messages.push(DATE_REQUIRED);
            None
        }
        Some(cell) => match cell_date(cell) {
            Some(d) if in_month_window(d, reference) => Some(d),
            // An unreadable date cannot be in the window either.
            _ => {
                messages.push(DATE_OUT_OF_WINDOW);
                None
            }
        },
    };

    let verified = matches!(raw.get("verified"), Some(CellValue::Text(s)) if s.to_lowercase() == "yes");

    match (name, amount, date) {
        (Some(name), Some(amount), Some(date)) if messages.is_empty() => Ok(Row {
            name,
            amount,
            date,
            verified,
        }),
        _ => Err(messages
            .into_iter()
            .map(|message| ValidationError {
                sheet_label: sheet_label.to_string(),
                row_number: index + ROW_NUMBER_OFFSET,
                message: message.to_string(),
            })
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2026, 10, 18)
    }

    fn good_row() -> RawRow {
        RawRow::new()
            .with("name", CellValue::Text("Asha Traders".into()))
            .with("amount", CellValue::Number(1500.0))
            .with("date", CellValue::Text("2026-10-02".into()))
            .with("verified", CellValue::Text("Yes".into()))
    }

    fn messages(result: std::result::Result<Row, Vec<ValidationError>>) -> Vec<String> {
        result.unwrap_err().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_valid_row_is_normalized() {
        let row = validate(&good_row(), 0, "Oct", today()).unwrap();
        assert_eq!(row.name, "Asha Traders");
        assert_eq!(row.amount, 1500.0);
        assert_eq!(row.date, day(2026, 10, 2));
        assert!(row.verified);
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let errors = validate(&RawRow::new(), 3, "Oct", today()).unwrap_err();
        let msgs: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec![NAME_REQUIRED, AMOUNT_REQUIRED, DATE_REQUIRED]);
        assert!(errors.iter().all(|e| e.row_number == 5 && e.sheet_label == "Oct"));
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let raw = good_row().with("name", CellValue::Text("   ".into()));
        assert_eq!(messages(validate(&raw, 0, "Oct", today())), vec![NAME_REQUIRED]);
    }

    #[test]
    fn test_amount_must_be_positive() {
        for bad in [
            CellValue::Number(0.0),
            CellValue::Number(-4.0),
            CellValue::Text("abc".into()),
            CellValue::Text("-1".into()),
            CellValue::Bool(true),
        ] {
            let raw = good_row().with("amount", bad.clone());
            assert_eq!(
                messages(validate(&raw, 0, "Oct", today())),
                vec![AMOUNT_NOT_POSITIVE],
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_amount_text_is_coerced() {
        let raw = good_row().with("amount", CellValue::Text(" 250.75 ".into()));
        assert_eq!(validate(&raw, 0, "Oct", today()).unwrap().amount, 250.75);
    }

    #[test]
    fn test_date_outside_month_is_rejected() {
        for date in ["2026-09-30", "2026-11-01", "2025-10-15", "not a date"] {
            let raw = good_row().with("date", CellValue::Text(date.into()));
            assert_eq!(
                messages(validate(&raw, 0, "Oct", today())),
                vec![DATE_OUT_OF_WINDOW],
                "{date}"
            );
        }
    }

    #[test]
    fn test_date_inside_month_is_preserved() {
        for (cell, expected) in [
            (CellValue::Date(day(2026, 10, 31)), day(2026, 10, 31)),
            (CellValue::Text("10/01/2026".into()), day(2026, 10, 1)),
            (CellValue::Text("2026-10-09T14:30:00Z".into()), day(2026, 10, 9)),
            (CellValue::Number(46300.0), day(2026, 10, 5)),
        ] {
            let raw = good_row().with("date", cell);
            assert_eq!(validate(&raw, 0, "Oct", today()).unwrap().date, expected);
        }
    }

    #[test]
    fn test_verified_only_for_yes() {
        let cases = [
            (Some(CellValue::Text("yes".into())), true),
            (Some(CellValue::Text("YES".into())), true),
            (Some(CellValue::Text("y".into())), false),
            (Some(CellValue::Text(" yes".into())), false),
            (Some(CellValue::Bool(true)), false),
            (None, false),
        ];
        for (cell, expected) in cases {
            let mut raw = RawRow::new()
                .with("name", CellValue::Text("A".into()))
                .with("amount", CellValue::Number(1.0))
                .with("date", CellValue::Date(today()));
            if let Some(c) = cell.clone() {
                raw.insert("verified", c);
            }
            assert_eq!(validate(&raw, 0, "Oct", today()).unwrap().verified, expected, "{cell:?}");
        }
    }

    #[test]
    fn test_revalidating_normalized_row_is_clean() {
        let row = validate(&good_row(), 0, "Oct", today()).unwrap();
        let again = validate(&RawRow::from(&row), 0, "Oct", today()).unwrap();
        assert_eq!(again, row);
    }

    #[test]
    fn test_in_month_window() {
        assert!(in_month_window(day(2026, 10, 1), today()));
        assert!(!in_month_window(day(2025, 10, 1), today()));
        assert!(!in_month_window(day(2026, 9, 30), today()));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), Some(day(2025, 1, 10)));
        assert_eq!(excel_serial_to_date(2_958_465.0), Some(day(9999, 12, 31)));
        for serial in [1e12, -1.0, f64::NAN, f64::INFINITY, 2_958_466.0] {
            assert_eq!(excel_serial_to_date(serial), None, "{serial}");
        }
    }

    #[test]
    fn test_huge_serial_date_is_a_row_error() {
        for serial in [1e12, f64::MAX, -5e15] {
            let raw = RawRow::new()
                .with("name", CellValue::Text("A".into()))
                .with("amount", CellValue::Number(1.0))
                .with("date", CellValue::Number(serial));
            assert_eq!(
                messages(validate(&raw, 0, "Oct", today())),
                vec![DATE_OUT_OF_WINDOW],
                "{serial}"
            );
        }
    }
}
