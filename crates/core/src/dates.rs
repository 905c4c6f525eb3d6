//! Calendar helpers for event scheduling.
//!
//! Dates travel through the system as `YYYY-MM-DD` strings (the format the
//! chat platform's date picker emits); these helpers parse, validate and
//! derive them.

use chrono::{Datelike, Duration, Local, NaiveDate};

const ISO_DATE: &str = "%Y-%m-%d";

const WEEKDAYS: [&str; 7] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Today's date in ISO form, on the local clock. Every "upcoming" boundary
/// and natural-date resolution goes through this one clock.
pub fn today() -> String {
    Local::now().date_naive().format(ISO_DATE).to_string()
}

/// True iff `value` is a valid calendar date in `YYYY-MM-DD` form.
pub fn is_day_formatted_as_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, ISO_DATE).is_ok()
}

/// Weekday name for an ISO date, or `None` if the date does not parse.
pub fn parse_date_to_weekday(value: &str) -> Option<&'static str> {
    let date = NaiveDate::parse_from_str(value, ISO_DATE).ok()?;
    Some(WEEKDAYS[date.weekday().num_days_from_monday() as usize])
}

/// Maps a weekday name ("Monday", "mon", ...) to 0..=4. Weekend days and
/// unknown names yield `None`: events are planned on working days only.
pub fn day_number(name: &str) -> Option<u32> {
    let normalized = name.trim().to_ascii_lowercase();
    let number = WEEKDAYS
        .iter()
        .position(|day| {
            let day = day.to_ascii_lowercase();
            normalized == day || (normalized.len() == 3 && day.starts_with(&normalized))
        })
        .map(|index| index as u32)?;

    if number >= 5 {
        return None;
    }
    Some(number)
}

/// Next occurrence of weekday `number` (0 = Monday), counting today as a
/// candidate, as an ISO date string.
pub fn next_weekday_as_date(number: u32) -> String {
    next_weekday_from(number, Local::now().date_naive())
}

pub fn next_weekday_from(number: u32, today: NaiveDate) -> String {
    let offset = (number + 7 - today.weekday().num_days_from_monday()) % 7;
    (today + Duration::days(i64::from(offset))).format(ISO_DATE).to_string()
}

/// Resolves a natural-language date expression against the current day.
///
/// Past expressions resolve to `None`: there is no point scheduling an
/// event for yesterday.
pub fn parse_natural_date(input: &str) -> Option<String> {
    natural_date_from(input, Local::now().date_naive())
}

pub fn natural_date_from(input: &str, today: NaiveDate) -> Option<String> {
    let normalized = input.trim().to_ascii_lowercase();

    match normalized.as_str() {
        "" => return None,
        "today" | "tonight" => return Some(today.format(ISO_DATE).to_string()),
        "tomorrow" => return Some((today + Duration::days(1)).format(ISO_DATE).to_string()),
        "next week" => return Some((today + Duration::days(7)).format(ISO_DATE).to_string()),
        "yesterday" => return None,
        _ => {}
    }

    if normalized.starts_with("last ") {
        return None;
    }

    if let Some(rest) = normalized.strip_prefix("in ") {
        let days = rest.strip_suffix(" days").or_else(|| rest.strip_suffix(" day"))?;
        let days: i64 = days.trim().parse().ok()?;
        if days < 0 {
            return None;
        }
        return Some((today + Duration::days(days)).format(ISO_DATE).to_string());
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, ISO_DATE) {
        if date < today {
            return None;
        }
        return Some(date.format(ISO_DATE).to_string());
    }

    // "next thursday" never resolves to today; a bare "thursday" may.
    let (name, skip_today) = match normalized.strip_prefix("next ") {
        Some(rest) => (rest, true),
        None => (normalized.as_str(), false),
    };
    let target = day_number(name)?;
    let mut offset = (target + 7 - today.weekday().num_days_from_monday()) % 7;
    if offset == 0 && skip_today {
        offset = 7;
    }
    Some((today + Duration::days(i64::from(offset))).format(ISO_DATE).to_string())
}
