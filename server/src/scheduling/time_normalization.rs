use super::SchedulingError;
use chrono::NaiveTime;
use lazy_static::lazy_static;

lazy_static! {
    static ref TWELVE_HOUR_TIME: regex::Regex =
        regex::Regex::new(r"(?i)^([0-9]{1,2}):([0-9]{2})(?::[0-9]{2})?\s*([ap])\.?m\.?$").unwrap();
    static ref TWENTY_FOUR_HOUR_TIME: regex::Regex =
        regex::Regex::new(r"^([0-9]{1,2}):([0-9]{2})(?::[0-9]{2}(?:\.[0-9]+)?)?$").unwrap();
}

/// Convert a user-supplied time of day into zero-padded 24-hour "HH:MM" form.
///
/// Accepts "H:MM", "HH:MM" and "HH:MM:SS" as well as 12-hour times like "5:00 PM" or "05:00pm".
/// Seconds are dropped. Input that is not recognized as a time of day is returned unchanged, so
/// this function never fails; use [parse_time_of_day] to get a validated value.
pub fn normalize_time(value: &str) -> String {
    normalize_recognized_time(value.trim()).unwrap_or_else(|| value.to_owned())
}

fn normalize_recognized_time(value: &str) -> Option<String> {
    if let Some(cap) = TWELVE_HOUR_TIME.captures(value) {
        let hour = parse_digits(&cap[1])?;
        let minute = parse_digits(&cap[2])?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let is_pm = cap[3].eq_ignore_ascii_case("p");
        let hour = hour % 12 + if is_pm { 12 } else { 0 };
        return Some(format!("{:02}:{:02}", hour, minute));
    }
    let cap = TWENTY_FOUR_HOUR_TIME.captures(value)?;
    let hour = parse_digits(&cap[1])?;
    let minute = parse_digits(&cap[2])?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}", hour, minute))
}

fn parse_digits(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok()
}

/// Normalize the given time string (see [normalize_time]) and parse it into a time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(&normalize_time(value), "%H:%M")
        .map_err(|_| SchedulingError::InvalidTime(value.to_owned()))
}

/// Format a time of day in the "HH:MM" form used by the API
pub fn format_time_of_day(value: &NaiveTime) -> String {
    value.format("%H:%M").to_string()
}
