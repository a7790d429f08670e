//! Due-date parsing and the "time remaining" breakdown shown next to a task.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::fmt;

use crate::error::{Error, Result};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    NoDueDate,
    Expired,
    Left { days: i64, hours: i64, minutes: i64 },
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::NoDueDate => f.write_str("no due date"),
            Remaining::Expired   => f.write_str("expired"),
            Remaining::Left { days, hours, minutes } => {
                write!(f, "{days}d {hours}h {minutes}m")
            }
        }
    }
}

pub fn remaining(limit: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Remaining {
    let Some(limit) = limit else { return Remaining::NoDueDate };
    let delta = (limit - now).num_seconds();
    if delta <= 0 {
        return Remaining::Expired;
    }
    Remaining::Left {
        days:    delta / 86_400,
        hours:   delta % 86_400 / 3_600,
        minutes: delta % 3_600 / 60,
    }
}

/// Parses a stored `limit`. RFC 3339 with any offset, or a naive date-time
/// read in the local zone.
pub fn parse_limit(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidTimestamp(raw.to_owned()))
}

pub fn format_remaining(limit: Option<&str>, now: DateTime<Utc>) -> Result<String> {
    let limit = limit.map(parse_limit).transpose()?;
    Ok(remaining(limit, now).to_string())
}

/// ISO-8601 with millisecond precision and a `Z` suffix, as sent to the API.
pub fn to_wire(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn to_local_input(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn to_local_display(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y/%m/%d %H:%M:%S").to_string()
}

/// Converts what the user typed into the due-date field into the wire form.
/// Blank input clears the due date.
pub fn parse_limit_input(input: &str) -> Result<Option<String>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_limit(input).map(|dt| Some(to_wire(dt)))
}
