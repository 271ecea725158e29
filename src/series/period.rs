//! Averaging periods for resampling.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, TimeDelta};

use super::Timestamp;
use crate::error::CorrelError;

/// Aggregation window length.
///
/// Fixed periods are anchored on the Unix epoch. Calendar periods start on the
/// first day of a month (or January 1st) at midnight, so a window is labelled by
/// its start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AveragingPeriod {
    /// `n` seconds
    Seconds(u32),
    /// `n` minutes
    Minutes(u32),
    /// `n` hours
    Hours(u32),
    /// `n` days
    Days(u32),
    /// `n` calendar months
    Months(u32),
    /// `n` calendar years
    Years(u32),
}

impl AveragingPeriod {
    /// Ten-minute windows, the usual logger resolution.
    pub fn ten_minutes() -> Self {
        Self::Minutes(10)
    }

    /// Hourly windows.
    pub fn hourly() -> Self {
        Self::Hours(1)
    }

    /// Daily windows.
    pub fn daily() -> Self {
        Self::Days(1)
    }

    /// Calendar-month windows.
    pub fn monthly() -> Self {
        Self::Months(1)
    }

    /// Calendar-year windows.
    pub fn annual() -> Self {
        Self::Years(1)
    }

    /// Multiplier of the period unit.
    pub fn count(&self) -> u32 {
        match *self {
            Self::Seconds(n)
            | Self::Minutes(n)
            | Self::Hours(n)
            | Self::Days(n)
            | Self::Months(n)
            | Self::Years(n) => n,
        }
    }

    /// True for month and year windows, whose length varies.
    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::Months(_) | Self::Years(_))
    }

    /// Exact window length for fixed periods.
    pub fn fixed_duration(&self) -> Option<TimeDelta> {
        let n = i64::from(self.count());
        match self {
            Self::Seconds(_) => Some(TimeDelta::seconds(n)),
            Self::Minutes(_) => Some(TimeDelta::minutes(n)),
            Self::Hours(_) => Some(TimeDelta::hours(n)),
            Self::Days(_) => Some(TimeDelta::days(n)),
            Self::Months(_) | Self::Years(_) => None,
        }
    }

    /// Shortest possible window length (28-day months, 365-day years).
    pub fn min_duration(&self) -> TimeDelta {
        let n = i64::from(self.count());
        match self {
            Self::Months(_) => TimeDelta::days(28 * n),
            Self::Years(_) => TimeDelta::days(365 * n),
            _ => self.fixed_duration().unwrap_or_else(TimeDelta::zero),
        }
    }

    /// Start of the window containing `timestamp`.
    pub fn window_start(&self, timestamp: Timestamp) -> Result<Timestamp, CorrelError> {
        match *self {
            Self::Months(n) => floor_months(timestamp, n),
            Self::Years(n) => floor_months(timestamp, n.saturating_mul(12)),
            _ => {
                let step = self.min_duration().num_seconds().max(1);
                let utc = timestamp.and_utc();
                let rem = utc.timestamp().rem_euclid(step);
                Ok(timestamp
                    - TimeDelta::seconds(rem)
                    - TimeDelta::nanoseconds(i64::from(utc.timestamp_subsec_nanos())))
            }
        }
    }

    /// Start of the window following the one starting at `start`.
    pub fn next_window_start(&self, start: Timestamp) -> Result<Timestamp, CorrelError> {
        let months = match *self {
            Self::Months(n) => n,
            Self::Years(n) => n.saturating_mul(12),
            _ => return Ok(start + self.min_duration()),
        };
        start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| CorrelError::InvalidInput(format!("window after {start} is out of range")))
    }

    fn validate(self) -> Result<Self, CorrelError> {
        if self.count() == 0 {
            return Err(CorrelError::Parse("averaging period must be positive".into()));
        }
        Ok(self)
    }
}

fn floor_months(timestamp: Timestamp, n: u32) -> Result<Timestamp, CorrelError> {
    let index = i64::from(timestamp.year()) * 12 + i64::from(timestamp.month0());
    let floored = index - index.rem_euclid(i64::from(n.max(1)));
    let year = floored.div_euclid(12) as i32;
    let month = floored.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CorrelError::InvalidInput(format!("month {year}-{month} is out of range")))
}

impl Default for AveragingPeriod {
    fn default() -> Self {
        Self::monthly()
    }
}

impl FromStr for AveragingPeriod {
    type Err = CorrelError;

    /// Parse frequency aliases: `"10min"`, `"10T"`, `"1H"`, `"1D"`, `"1W"`,
    /// `"1M"`, `"1MS"`, `"1AS"`, `"1Y"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        let n: u32 = if digits.is_empty() {
            1
        } else {
            digits
                .parse()
                .map_err(|_| CorrelError::Parse(format!("invalid period multiplier in '{s}'")))?
        };

        let period = match unit {
            "s" | "S" | "sec" => Self::Seconds(n),
            "min" | "T" => Self::Minutes(n),
            "h" | "H" => Self::Hours(n),
            "d" | "D" => Self::Days(n),
            "W" => Self::Days(n.saturating_mul(7)),
            "M" | "MS" => Self::Months(n),
            "A" | "AS" | "Y" | "YS" => Self::Years(n),
            _ => {
                return Err(CorrelError::Parse(format!(
                    "unknown averaging period '{s}'"
                )));
            }
        };

        period.validate()
    }
}

impl fmt::Display for AveragingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(n) => write!(f, "{n}s"),
            Self::Minutes(n) => write!(f, "{n}min"),
            Self::Hours(n) => write!(f, "{n}H"),
            Self::Days(n) => write!(f, "{n}D"),
            Self::Months(n) => write!(f, "{n}MS"),
            Self::Years(n) => write!(f, "{n}AS"),
        }
    }
}
