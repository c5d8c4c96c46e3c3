//! Display formatting for comparison values and reports.

use chrono::NaiveDate;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_RATINGS: &str = "No ratings yet";

/// Formats a measurement with its unit, or [`NOT_SPECIFIED`] when unknown.
pub fn with_unit<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v} {unit}"),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// Whole-lira price with `.` as thousands separator: `₺1.250.000`.
pub fn price(value: Option<u64>) -> String {
    match value {
        Some(v) => format!("₺{}", group_thousands(v)),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// `4.5 ★ (12)`, or [`NO_RATINGS`] when the car has no rating.
pub fn rating(average: Option<f64>, review_count: u32) -> String {
    match average {
        Some(avg) => format!("{} ★ ({review_count})", (avg * 10.0).round() / 10.0),
        None => NO_RATINGS.to_string(),
    }
}

/// Day-first report date: `15.10.2026`.
pub fn report_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out
}
