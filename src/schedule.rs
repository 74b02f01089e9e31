//! Date and time parsing for post input

use anyhow::{Result, anyhow};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike, Weekday};

/// Parse a post date relative to today (local time).
///
/// See [`parse_post_date_from`] for the accepted formats.
pub fn parse_post_date(input: &str) -> Result<NaiveDate> {
    parse_post_date_from(input, Local::now().date_naive())
}

/// Parse a post date relative to `today`
///
/// Supports formats:
/// - Keywords: "today", "tomorrow", "yesterday"
/// - Relative: "+3d", "+2w", "in 3 days", "in 2 weeks"
/// - Weekday: "monday", "fri" (next occurrence after today)
/// - Absolute: "YYYY-MM-DD", "YYYY/MM/DD", "DD/MM/YYYY"
pub fn parse_post_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('+') {
        return parse_short_offset(rest)
            .map(|offset| today + offset)
            .ok_or_else(|| anyhow!("Could not parse date offset: '+{rest}'"));
    }

    if let Some(rest) = input.strip_prefix("in ") {
        return parse_long_offset(rest).map(|offset| today + offset);
    }

    if let Some(weekday) = parse_weekday(&input) {
        let ahead = (7 + weekday.num_days_from_sunday() - today.weekday().num_days_from_sunday()) % 7;
        let ahead = if ahead == 0 { 7 } else { ahead };
        return Ok(today + Duration::days(i64::from(ahead)));
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            return Ok(date);
        }
    }

    Err(anyhow!(
        "Could not parse date: '{input}'\n\
         Supported formats:\n  \
         - Keywords: 'today', 'tomorrow', 'yesterday'\n  \
         - Relative: '+3d', '+2w', 'in 3 days'\n  \
         - Weekday: 'monday', 'fri'\n  \
         - Date: 'YYYY-MM-DD', 'DD/MM/YYYY'"
    ))
}

/// Parse short offsets: 3d, 2w
fn parse_short_offset(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let (num_str, unit) = input.split_at(input.len() - 1);
    let amount: i64 = num_str.parse().ok()?;
    match unit {
        "d" => Some(Duration::days(amount)),
        "w" => Some(Duration::weeks(amount)),
        _ => None,
    }
}

/// Parse long offsets: "3 days", "2 weeks", "1 day"
fn parse_long_offset(input: &str) -> Result<Duration> {
    let input = input.trim();
    if let Some(duration) = parse_short_offset(input) {
        return Ok(duration);
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() >= 2
        && let Ok(amount) = parts[0].parse::<i64>()
    {
        let unit = parts[1].trim_end_matches('s');
        return match unit {
            "day" => Ok(Duration::days(amount)),
            "week" => Ok(Duration::weeks(amount)),
            _ => Err(anyhow!("Unknown date unit: {}", parts[1])),
        };
    }

    Err(anyhow!(
        "Could not parse relative date: '{input}'\n\
         Examples: '3 days', '2 weeks', '5d'"
    ))
}

fn parse_weekday(input: &str) -> Option<Weekday> {
    let weekday = match input {
        "sunday" | "sun" => Weekday::Sun,
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        _ => return None,
    };
    Some(weekday)
}

/// Parse a post time: "15:00", "9", "3pm", "3:30pm"
pub fn parse_post_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim().to_lowercase().replace(' ', "");

    // Try 24-hour format
    if let Ok(time) = NaiveTime::parse_from_str(&input, "%H:%M") {
        return Some(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(&input, "%H:%M:%S") {
        return NaiveTime::from_hms_opt(time.hour(), time.minute(), 0);
    }
    if let Ok(hour) = input.parse::<u32>() {
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    // Try 12-hour format with am/pm
    let is_pm = input.ends_with("pm");
    if is_pm || input.ends_with("am") {
        let time_part = &input[..input.len() - 2];
        let mut parts = time_part.split(':');
        let mut hour: u32 = parts.next()?.parse().ok()?;
        let minute: u32 = match parts.next() {
            Some(m) => m.parse().ok()?,
            None => 0,
        };
        if hour == 0 || hour > 12 {
            return None;
        }

        // Convert to 24-hour
        if is_pm && hour != 12 {
            hour += 12;
        } else if !is_pm && hour == 12 {
            hour = 0;
        }

        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    None
}

/// Parse a KPI month: "YYYY-MM", "MM/YYYY", or a date (its month)
pub fn parse_month(input: &str) -> Result<String> {
    let input = input.trim();
    let with_day = format!("{input}-01");
    if let Ok(date) = NaiveDate::parse_from_str(&with_day, "%Y-%m-%d") {
        return Ok(date.format("%Y-%m").to_string());
    }
    let with_day = format!("01/{input}");
    if let Ok(date) = NaiveDate::parse_from_str(&with_day, "%d/%m/%Y") {
        return Ok(date.format("%Y-%m").to_string());
    }
    if let Ok(date) = parse_post_date(input) {
        return Ok(date.format("%Y-%m").to_string());
    }
    Err(anyhow!("Could not parse month: '{input}' (expected YYYY-MM)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_keywords() {
        let today = day(2026, 3, 14);
        assert_eq!(parse_post_date_from("Today", today).unwrap(), today);
        assert_eq!(parse_post_date_from("tomorrow", today).unwrap(), day(2026, 3, 15));
        assert_eq!(parse_post_date_from("yesterday", today).unwrap(), day(2026, 3, 13));
    }

    #[test]
    fn test_relative() {
        let today = day(2026, 3, 14);
        assert_eq!(parse_post_date_from("+3d", today).unwrap(), day(2026, 3, 17));
        assert_eq!(parse_post_date_from("+2w", today).unwrap(), day(2026, 3, 28));
        assert_eq!(parse_post_date_from("in 3 days", today).unwrap(), day(2026, 3, 17));
        assert_eq!(parse_post_date_from("in 1 week", today).unwrap(), day(2026, 3, 21));
        assert!(parse_post_date_from("in 3 fortnights", today).is_err());
    }

    #[test]
    fn test_weekday_is_next_occurrence() {
        // 2026-03-14 is a Saturday
        let today = day(2026, 3, 14);
        assert_eq!(parse_post_date_from("monday", today).unwrap(), day(2026, 3, 16));
        assert_eq!(parse_post_date_from("sat", today).unwrap(), day(2026, 3, 21));
    }

    #[test]
    fn test_absolute_formats() {
        let today = day(2026, 3, 14);
        assert_eq!(parse_post_date_from("2026-04-01", today).unwrap(), day(2026, 4, 1));
        assert_eq!(parse_post_date_from("2026/04/01", today).unwrap(), day(2026, 4, 1));
        assert_eq!(parse_post_date_from("01/04/2026", today).unwrap(), day(2026, 4, 1));
        assert!(parse_post_date_from("2026-02-30", today).is_err());
    }

    #[test]
    fn test_times() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_post_time("15:00"), Some(t(15, 0)));
        assert_eq!(parse_post_time("9"), Some(t(9, 0)));
        assert_eq!(parse_post_time("3pm"), Some(t(15, 0)));
        assert_eq!(parse_post_time("3:30 PM"), Some(t(15, 30)));
        assert_eq!(parse_post_time("12am"), Some(t(0, 0)));
        assert_eq!(parse_post_time("12pm"), Some(t(12, 0)));
        assert_eq!(parse_post_time("25:00"), None);
        assert_eq!(parse_post_time("13pm"), None);
        assert_eq!(parse_post_time("noon"), None);
    }

    #[test]
    fn test_month() {
        assert_eq!(parse_month("2026-03").unwrap(), "2026-03");
        assert_eq!(parse_month("03/2026").unwrap(), "2026-03");
        assert_eq!(parse_month("2026-03-18").unwrap(), "2026-03");
        assert!(parse_month("March").is_err());
    }
}
