//! Per-service restart windows: day-of-week and hour-of-day lists.
//!
//! A window spec is a list of tokens, each a single value or an inclusive
//! `start-end` range. Day tokens may use `mon`..`sun` (Monday = 0). Ranges do
//! not wrap: `22-2` matches nothing.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use thiserror::Error;

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// A token that is neither an integer nor a range of integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {token:?} in window spec")]
pub struct ScheduleParseError {
    pub token: String,
}

/// The current weekday and hour, as the window checks see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    /// 0 = Monday … 6 = Sunday.
    pub dow: u32,
    /// 0..=23.
    pub hour: u32,
}

impl WallClock {
    #[must_use]
    pub const fn new(dow: u32, hour: u32) -> Self {
        Self { dow, hour }
    }

    /// Local wall-clock time right now.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now())
    }

    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self {
            dow: at.weekday().num_days_from_monday(),
            hour: at.hour(),
        }
    }
}

/// Whether `dow` is inside `spec`. An empty spec is unconstrained.
pub fn check_dow<S: AsRef<str>>(dow: u32, spec: &[S]) -> Result<bool, ScheduleParseError> {
    matches_spec(dow, spec, substitute_weekdays)
}

/// Whether `hour` is inside `spec`. An empty spec is unconstrained.
pub fn check_hour<S: AsRef<str>>(hour: u32, spec: &[S]) -> Result<bool, ScheduleParseError> {
    matches_spec(hour, spec, str::to_string)
}

/// Both dimensions must pass.
pub fn in_window<S: AsRef<str>>(
    now: WallClock,
    dow_spec: &[S],
    hour_spec: &[S],
) -> Result<bool, ScheduleParseError> {
    Ok(check_dow(now.dow, dow_spec)? && check_hour(now.hour, hour_spec)?)
}

fn matches_spec<S: AsRef<str>>(
    value: u32,
    spec: &[S],
    normalize: impl Fn(&str) -> String,
) -> Result<bool, ScheduleParseError> {
    if spec.is_empty() {
        return Ok(true);
    }
    // Parse every token even after a hit so a typo is always reported.
    let mut found = false;
    for token in spec {
        let range = parse_token(&normalize(token.as_ref()))?;
        found |= range.contains(&value);
    }
    Ok(found)
}

fn substitute_weekdays(token: &str) -> String {
    WEEKDAYS
        .iter()
        .enumerate()
        .fold(token.to_string(), |acc, (idx, day)| {
            acc.replace(day, &idx.to_string())
        })
}

fn parse_token(token: &str) -> Result<RangeInclusive<u32>, ScheduleParseError> {
    let invalid = || ScheduleParseError {
        token: token.to_string(),
    };
    let parse = |s: &str| s.trim().parse::<u32>().map_err(|_| invalid());
    match token.split_once('-') {
        Some((start, end)) => Ok(parse(start)?..=parse(end)?),
        None => {
            let single = parse(token)?;
            Ok(single..=single)
        }
    }
}
