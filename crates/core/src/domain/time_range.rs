// Query Time Range

use super::error::{DomainError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};

/// Accepted format for `--datefrom` / `--dateto`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time window of a LEQL query (`leql.during`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRange {
    /// Server-side relative range, e.g. "last 2 days"
    Relative(String),
    /// Absolute window in epoch milliseconds
    Absolute { from_ms: i64, to_ms: i64 },
}

impl TimeRange {
    /// Build from epoch seconds
    pub fn from_epoch_seconds(from: i64, to: i64) -> Result<Self> {
        if to < from {
            return Err(DomainError::InvalidTimeRange(format!(
                "end time {} is before start time {}",
                to, from
            )));
        }
        Ok(TimeRange::Absolute {
            from_ms: to_millis(from)?,
            to_ms: to_millis(to)?,
        })
    }

    /// Build from two `YYYY-MM-DD HH:MM:SS` dates in local time
    pub fn from_dates(from: &str, to: &str) -> Result<Self> {
        Self::from_dates_in(from, to, &Local)
    }

    /// Build from two dates interpreted in the given timezone
    pub fn from_dates_in<Tz: TimeZone>(from: &str, to: &str, tz: &Tz) -> Result<Self> {
        let from = parse_date_in(from, tz)?;
        let to = parse_date_in(to, tz)?;
        Self::from_epoch_seconds(from, to)
    }

    /// The `seconds` leading up to `now`
    pub fn last_seconds(now: DateTime<Utc>, seconds: i64) -> Result<Self> {
        let to = now.timestamp();
        let from = to.checked_sub(seconds).ok_or_else(|| {
            DomainError::InvalidTimeRange(format!("{} seconds reaches past the epoch range", seconds))
        })?;
        Self::from_epoch_seconds(from, to)
    }

    /// JSON form used as `leql.during`
    pub fn to_json(&self) -> Value {
        match self {
            TimeRange::Relative(range) => json!({ "time_range": range }),
            TimeRange::Absolute { from_ms, to_ms } => json!({ "from": from_ms, "to": to_ms }),
        }
    }

    /// URL parameter form used when running saved queries
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        match self {
            TimeRange::Relative(range) => vec![("time_range".to_string(), range.clone())],
            TimeRange::Absolute { from_ms, to_ms } => vec![
                ("from".to_string(), from_ms.to_string()),
                ("to".to_string(), to_ms.to_string()),
            ],
        }
    }
}

fn to_millis(seconds: i64) -> Result<i64> {
    seconds.checked_mul(1000).ok_or_else(|| {
        DomainError::InvalidTimeRange(format!("{} is out of range for epoch seconds", seconds))
    })
}

/// Parse a `YYYY-MM-DD HH:MM:SS` date into epoch seconds
fn parse_date_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DomainError::InvalidTimeRange(format!(
            "'{}' is not a valid date ({}), expected format: YYYY-MM-DD HH:MM:SS",
            value, e
        ))
    })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            DomainError::InvalidTimeRange(format!("'{}' does not exist in local time", value))
        })
}
