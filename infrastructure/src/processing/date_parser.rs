//! Receipt date parsing.

use chrono::{Datelike, Local, NaiveDate};
use expense_domain::ExpenseData;
use regex::Regex;
use std::sync::LazyLock;

/// Formats tried in order; the first that parses the whole string with a
/// four-digit year wins.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d", // 2024-06-18
    "%d-%m-%Y", // 18-06-2024
    "%d/%m/%Y", // 18/06/2024
    "%m/%d/%Y", // 06/18/2024
    "%d.%m.%Y", // 18.06.2024
    "%d-%m-%y", // 18-06-24
    "%d/%m/%y", // 18/06/24
    "%Y%m%d",   // 20240618
    "%d%m%Y",   // 18062024
];

static DMY_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").expect("valid date pattern")
});
static DMY_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{2})").expect("valid date pattern")
});

fn from_captures(re: &Regex, text: &str, century: i32) -> Option<NaiveDate> {
    let caps = re.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(century + year, month, day)
}

/// Parse a date as printed on a receipt.
///
/// Returns `None` for empty input, `N/A`, and anything unrecognized.
pub fn parse_receipt_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text == "N/A" {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .filter(|date| date.year() >= 1000)
        })
        .or_else(|| from_captures(&DMY_LONG, text, 0))
        .or_else(|| from_captures(&DMY_SHORT, text, 2000))
}

/// Ledger date for an expense: the receipt's own date if it parses, else
/// the message date, else today. Always `%Y-%m-%d`.
pub fn determine_expense_date(expense: &ExpenseData, message_date: Option<NaiveDate>) -> String {
    expense
        .date
        .as_deref()
        .and_then(parse_receipt_date)
        .or(message_date)
        .unwrap_or_else(|| Local::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}
