//! Calendar-day arithmetic (no chrono dependency).
//!
//! A `CalendarDay` has no time-of-day component. Callers normalise wall-clock
//! time to their local day before handing it to the engine, so every streak and
//! rotation rule here is plain integer arithmetic on day numbers.
//!
//! Uses Howard Hinnant's days_from_civil / civil_from_days algorithms.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Earliest and latest years a `CalendarDay` can represent.
pub const MIN_YEAR: i64 = -999_999;
pub const MAX_YEAR: i64 = 999_999;

const MIN_DAYS: i64 = days_from_civil(MIN_YEAR, 1, 1);
const MAX_DAYS: i64 = days_from_civil(MAX_YEAR, 12, 31);

/// A date, stored as days since 1970-01-01.
///
/// Always within `MIN_YEAR..=MAX_YEAR`; constructors saturate or reject
/// rather than overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDay(i64);

impl CalendarDay {
    /// Saturates at the representable range.
    pub const fn from_days(days: i64) -> Self {
        if days < MIN_DAYS {
            Self(MIN_DAYS)
        } else if days > MAX_DAYS {
            Self(MAX_DAYS)
        } else {
            Self(days)
        }
    }

    /// Build from year/month/day, rejecting impossible dates and years
    /// outside `MIN_YEAR..=MAX_YEAR`.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year)
            || !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
        {
            return None;
        }
        Some(Self(days_from_civil(year, month, day)))
    }

    /// Parse `YYYY-MM-DD`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidDate(s.to_string());
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse::<i64>().ok());
        let month = parts.next().and_then(|p| p.parse::<u32>().ok());
        let day = parts.next().and_then(|p| p.parse::<u32>().ok());
        match (year, month, day) {
            (Some(y), Some(m), Some(d)) => Self::from_ymd(y, m, d).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    pub fn days(self) -> i64 {
        self.0
    }

    pub fn ymd(self) -> (i64, u32, u32) {
        civil_from_days(self.0)
    }

    pub fn succ(self) -> Self {
        Self::from_days(self.0 + 1)
    }

    pub fn pred(self) -> Self {
        Self::from_days(self.0 - 1)
    }

    /// Signed number of days from `earlier` to `self`.
    pub fn days_since(self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }

    /// ISO weekday: 1 = Monday … 7 = Sunday.
    pub fn weekday(self) -> u32 {
        // 1970-01-01 was a Thursday
        ((self.0 + 3).rem_euclid(7) + 1) as u32
    }

    /// 1-based ordinal day within the year.
    pub fn day_of_year(self) -> u32 {
        let (y, _, _) = self.ymd();
        (self.0 - days_from_civil(y, 1, 1) + 1) as u32
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d) = self.ymd();
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl FromStr for CalendarDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDay {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CalendarDay> for String {
    fn from(day: CalendarDay) -> Self {
        day.to_string()
    }
}

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Today's date in UTC.
pub fn today_utc() -> CalendarDay {
    CalendarDay((now_unix_secs() / 86400) as i64)
}

fn is_leap(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Howard Hinnant's days_from_civil: (year, month, day) → Unix epoch days.
const fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let m = month as u64;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe as i64 - 719468
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m as u32, d as u32)
}
