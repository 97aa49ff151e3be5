use chrono::NaiveDate;

use crate::models::ImportSummary;

/// Format an amount in Indian digit grouping with a rupee sign: ₹12,34,567.89
pub fn rupees(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    // Last three digits stay together, the rest group in pairs.
    let split = int_part.len().saturating_sub(3);
    let (head, tail) = int_part.split_at(split);
    let mut grouped = String::new();
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !head.is_empty() {
        grouped.push(',');
    }
    grouped.push_str(tail);

    if negative {
        format!("-\u{20b9}{grouped}.{dec_part}")
    } else {
        format!("\u{20b9}{grouped}.{dec_part}")
    }
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

pub fn yes_no(val: bool) -> &'static str {
    if val {
        "Yes"
    } else {
        "No"
    }
}

pub fn import_message(summary: &ImportSummary) -> String {
    format!(
        "Successfully imported {} records. {} records were skipped.",
        summary.imported, summary.skipped
    )
}
