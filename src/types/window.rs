//! Forecast windows and how their timestamps are represented in the logs.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// The half-open time span `[start, end)` requested from a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ForecastWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24 hours starting at local midnight of `today + day_offset` in `tz`.
    ///
    /// When midnight does not exist locally (a DST gap), the window starts at the
    /// first valid instant after it.
    ///
    /// ```
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use forecast_history::ForecastWindow;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    /// let window = ForecastWindow::for_day(today, 1, chrono_tz::America::New_York);
    /// assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 7, 2, 4, 0, 0).unwrap());
    /// assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 7, 3, 4, 0, 0).unwrap());
    /// ```
    pub fn for_day(today: NaiveDate, day_offset: u32, tz: Tz) -> Self {
        let day = today
            .checked_add_days(Days::new(u64::from(day_offset)))
            .unwrap_or(today);
        let start = local_start_of_day(day, tz);
        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time < self.end
    }
}

fn local_start_of_day(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    // Walk forward through a DST gap in 15 minute steps; gaps never exceed a few hours.
    let mut candidate = midnight;
    for _ in 0..16 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(15),
        }
    }
    Utc.from_utc_datetime(&midnight)
}

/// How the `Date` index of a historical log is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexTimezone {
    /// Naive wall-clock time in the site's timezone.
    #[default]
    Local,
    /// Naive UTC.
    Utc,
}

impl IndexTimezone {
    /// Converts `time` into the naive timestamp stored in the log.
    pub fn naive(&self, time: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
        match self {
            IndexTimezone::Local => time.with_timezone(&tz).naive_local(),
            IndexTimezone::Utc => time.naive_utc(),
        }
    }
}

impl fmt::Display for IndexTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTimezone::Local => f.write_str("local"),
            IndexTimezone::Utc => f.write_str("utc"),
        }
    }
}

impl FromStr for IndexTimezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(IndexTimezone::Local),
            "utc" => Ok(IndexTimezone::Utc),
            other => Err(format!(
                "unknown index timezone '{other}', expected 'local' or 'utc'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America, Europe};

    #[test]
    fn test_window_is_24_hours_from_local_midnight() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let window = ForecastWindow::for_day(today, 0, America::Denver);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap()
        );
        assert_eq!(window.end - window.start, Duration::hours(24));
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_window_on_dst_change_day() {
        // Clocks go forward at 02:00 on 2024-03-10; midnight still exists.
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = ForecastWindow::for_day(today, 0, America::New_York);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_when_midnight_is_skipped() {
        // Santiago skips 00:00-01:00 on 2024-09-08.
        let today = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let window = ForecastWindow::for_day(today, 0, America::Santiago);
        let local = window.start.with_timezone(&America::Santiago);
        assert_eq!(local.naive_local().date(), today);
        assert_eq!(local.naive_local().time().to_string(), "01:00:00");
    }

    #[test]
    fn test_index_timezone_conversion() {
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        assert_eq!(
            IndexTimezone::Local.naive(time, Europe::Amsterdam).to_string(),
            "2024-07-01 14:00:00"
        );
        assert_eq!(
            IndexTimezone::Utc.naive(time, Europe::Amsterdam).to_string(),
            "2024-07-01 12:00:00"
        );
        assert_eq!("UTC".parse(), Ok(IndexTimezone::Utc));
        assert!("gmt".parse::<IndexTimezone>().is_err());
    }
}
