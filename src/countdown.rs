use crate::error::{AppError, Result};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    /// Breaks a millisecond difference into whole units. Past targets give zero.
    pub fn from_millis(diff: i64) -> Self {
        if diff <= 0 {
            return Self::default();
        }
        Self {
            days: (diff / MS_PER_DAY) as u64,
            hours: ((diff % MS_PER_DAY) / MS_PER_HOUR) as u64,
            minutes: ((diff % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
            seconds: ((diff % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
        }
    }

    pub fn until<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> Self {
        Self::from_millis(target.clone().signed_duration_since(now.clone()).num_milliseconds())
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Midnight on the first of January following `now`, in local time.
pub fn next_new_year(now: &DateTime<Local>) -> Result<DateTime<Local>> {
    let year = now.year() + 1;
    Local
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .earliest()
        .ok_or_else(|| AppError::InvalidTarget(format!("no local midnight on {year}-01-01")))
}

/// Parses `YYYY-MM-DD HH:MM:SS` as local time.
pub fn parse_target(text: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| AppError::InvalidTarget(format!("{text:?}: {e}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| AppError::InvalidTarget(format!("{text:?} does not exist in local time")))
}
