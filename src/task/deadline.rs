//! Deadline parsing and formatting
//!
//! Deadlines are local wall-clock times without a timezone. On disk they use
//! the `datetime-local` layout (`2026-03-14T18:30`), with seconds appended only
//! when they are non-zero.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const STORAGE_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("Empty deadline")]
    Empty,

    #[error(
        "Unrecognized deadline '{0}'.\n\
         Use 'YYYY-MM-DD HH:MM', 'HH:MM' (today) or an offset like '+90m', '+2h', '+3d'"
    )]
    Unrecognized(String),

    #[error("Deadline offset out of range: {0}")]
    OutOfRange(String),
}

/// Format a deadline for storage
pub fn to_storage(deadline: &NaiveDateTime) -> String {
    if deadline.second() == 0 && deadline.nanosecond() == 0 {
        deadline.format(STORAGE_FORMAT).to_string()
    } else {
        deadline.format(STORAGE_FORMAT_SECS).to_string()
    }
}

/// Parse a stored deadline (with or without seconds)
pub fn from_storage(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, STORAGE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, STORAGE_FORMAT_SECS))
        .or_else(|_| s.parse::<NaiveDateTime>())
        .ok()
}

/// Format a deadline for humans
pub fn display(deadline: &NaiveDateTime) -> String {
    deadline.format(DISPLAY_FORMAT).to_string()
}

/// Parse a deadline typed on the command line, relative to `now`.
pub fn parse_input(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime, DeadlineError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DeadlineError::Empty);
    }

    if let Some(offset) = input.strip_prefix('+') {
        return parse_offset(offset, now);
    }

    for fmt in INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt);
        }
    }

    if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        return Ok(now.date().and_time(time));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        // A bare date means the end of that day
        if let Some(dt) = date.and_hms_opt(23, 59, 0) {
            return Ok(dt);
        }
    }

    Err(DeadlineError::Unrecognized(input.to_string()))
}

fn parse_offset(offset: &str, now: NaiveDateTime) -> Result<NaiveDateTime, DeadlineError> {
    let unrecognized = || DeadlineError::Unrecognized(format!("+{offset}"));

    let unit = offset.chars().last().ok_or_else(unrecognized)?;
    let amount: i64 = offset[..offset.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| unrecognized())?;

    let delta = match unit {
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        _ => return Err(unrecognized()),
    }
    .ok_or_else(|| DeadlineError::OutOfRange(format!("+{offset}")))?;

    now.checked_add_signed(delta)
        .ok_or_else(|| DeadlineError::OutOfRange(format!("+{offset}")))
}

/// Serde adapter for the storage layout
pub mod serde_local {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(deadline: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_storage(deadline))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::from_storage(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid deadline: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_storage_format_drops_zero_seconds() {
        assert_eq!(to_storage(&now()), "2026-03-14T12:00");
        let with_secs = now() + Duration::seconds(7);
        assert_eq!(to_storage(&with_secs), "2026-03-14T12:00:07");
    }

    #[test]
    fn test_from_storage_accepts_both_layouts() {
        assert_eq!(from_storage("2026-03-14T12:00"), Some(now()));
        assert_eq!(
            from_storage("2026-03-14T12:00:07"),
            Some(now() + Duration::seconds(7))
        );
        assert_eq!(from_storage("tomorrow"), None);
    }

    #[test]
    fn test_parse_input_absolute() {
        let expected = NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_input("2026-04-01 08:30", now()), Ok(expected));
        assert_eq!(parse_input("2026-04-01T08:30", now()), Ok(expected));
    }

    #[test]
    fn test_parse_input_time_only_is_today() {
        let expected = now().date().and_hms_opt(17, 45, 0).unwrap();
        assert_eq!(parse_input("17:45", now()), Ok(expected));
    }

    #[test]
    fn test_parse_input_bare_date_is_end_of_day() {
        let expected = NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(parse_input("2026-04-01", now()), Ok(expected));
    }

    #[test]
    fn test_parse_input_offsets() {
        assert_eq!(parse_input("+90m", now()), Ok(now() + Duration::minutes(90)));
        assert_eq!(parse_input("+2h", now()), Ok(now() + Duration::hours(2)));
        assert_eq!(parse_input("+3d", now()), Ok(now() + Duration::days(3)));
    }

    #[test]
    fn test_parse_input_rejects_garbage() {
        assert_eq!(parse_input("", now()), Err(DeadlineError::Empty));
        assert!(matches!(
            parse_input("soon", now()),
            Err(DeadlineError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_input("+5w", now()),
            Err(DeadlineError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_input("+", now()),
            Err(DeadlineError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&now()), "2026-03-14 12:00");
    }
}
