//! Conversions between wall-clock strings and minutes-since-midnight.
//!
//! Every other component works in minutes; display strings are derived on
//! demand so stored times and labels can never drift apart. Malformed input
//! degrades to minute 0 instead of erroring, which places the item at the
//! start of the day and keeps sorting and gap-filling well-defined.

/// Minutes in a full day
pub const DAY_END_MINUTES: u32 = 24 * 60;

/// Parse `"HH:MM"` or `"H:MM AM/PM"` into minutes since midnight.
///
/// Empty or malformed input yields 0; this function never fails.
pub fn parse_time(s: &str) -> u32 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let upper = trimmed.to_ascii_uppercase();
    let (body, is_pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let Some((hour_str, minute_str)) = body.split_once(':') else {
        return 0;
    };
    let hour: u32 = match hour_str.trim().parse() {
        Ok(h) => h,
        Err(_) => return 0,
    };
    let minute: u32 = match minute_str.trim().parse() {
        Ok(m) => m,
        Err(_) => return 0,
    };
    if minute > 59 {
        return 0;
    }

    let hour24 = match is_pm {
        // 12-hour clock: 12 AM is midnight, 12 PM is noon
        Some(pm) => match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (1..=11, false) => hour,
            (1..=11, true) => hour + 12,
            _ => return 0,
        },
        None => {
            if hour > 23 {
                return 0;
            }
            hour
        }
    };

    hour24 * 60 + minute
}

/// Format minutes as 24-hour `"HH:MM"`. Values past midnight wrap on the
/// hour (the caller normally guarantees `0..1440`).
pub fn format_minutes_24(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours, mins)
}

/// Format minutes as 12-hour `"H:MM AM/PM"` with no leading hour zero
pub fn format_minutes_12(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;
    let meridiem = if hours < 12 { "AM" } else { "PM" };
    let display_hour = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, mins, meridiem)
}

/// Convert a 12-hour display string to canonical `"HH:MM"`
pub fn to_24_hour(display: &str) -> String {
    format_minutes_24(parse_time(display))
}

/// Convert a canonical `"HH:MM"` string to its 12-hour display form
pub fn to_12_hour(time: &str) -> String {
    format_minutes_12(parse_time(time))
}
