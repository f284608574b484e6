//! Display helpers used by render sinks.

use chrono::NaiveDate;

pub const NOT_AVAILABLE: &str = "N/A";

/// `"2024-05-01"` → `"May 1"`.
///
/// The string is read as a plain calendar date, so no time-zone conversion can
/// shift it to a neighbouring day.
pub fn format_forecast_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(day) => day.format("%b %-d").to_string(),
        Err(_) => NOT_AVAILABLE.to_string(),
    }
}

/// `"Monday"` → `"Mon"`.
pub fn short_day_name(day_of_week: &str) -> String {
    if day_of_week.chars().count() < 3 {
        return NOT_AVAILABLE.to_string();
    }
    day_of_week.chars().take(3).collect()
}

/// `"15:00"` → `"3 PM"`.
pub fn format_hour_time(time: &str) -> String {
    let Some((hour, _)) = time.split_once(':') else {
        return NOT_AVAILABLE.to_string();
    };
    let Some(hour) = leading_int(hour) else {
        return NOT_AVAILABLE.to_string();
    };

    match hour {
        0 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h < 12 => format!("{h} AM"),
        h => format!("{} PM", h - 12),
    }
}

// Integer prefix: leading whitespace, optional sign, then digits. Trailing
// junk is ignored, so "09" and " 9h" both read as 9.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}
