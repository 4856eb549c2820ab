//! Contains [`HistoryLazyFrame`] for lazy queries over one historical log.

use crate::types::forecast_run::DATE_COLUMN;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{col, lit, Expr, IdxSize, LazyFrame};

/// A wrapper around a Polars `LazyFrame` holding a historical forecast log.
///
/// The `Date` column is timezone-naive. Depending on how the log was written it
/// holds either site-local wall-clock times or UTC, so range bounds are taken as
/// naive datetimes in that same representation.
#[derive(Clone)]
pub struct HistoryLazyFrame {
    /// The underlying Polars LazyFrame, sorted by `Date`.
    pub frame: LazyFrame,
}

impl HistoryLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Applies an arbitrary Polars predicate lazily.
    pub fn filter(&self, predicate: Expr) -> HistoryLazyFrame {
        HistoryLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps rows with `Date >= start`.
    pub fn since(&self, start: NaiveDateTime) -> HistoryLazyFrame {
        self.filter(col(DATE_COLUMN).gt_eq(lit(start)))
    }

    /// Keeps rows with `Date <= end`.
    pub fn until(&self, end: NaiveDateTime) -> HistoryLazyFrame {
        self.filter(col(DATE_COLUMN).lt_eq(lit(end)))
    }

    /// Keeps rows with `start <= Date <= end`.
    pub fn get_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> HistoryLazyFrame {
        self.since(start).until(end)
    }

    /// Keeps every row whose `Date` falls on a calendar day from `first` through
    /// `last`. A missing bound leaves that side open.
    pub fn get_days(&self, first: Option<NaiveDate>, last: Option<NaiveDate>) -> HistoryLazyFrame {
        let mut frame = self.clone();
        if let Some(first) = first {
            frame = frame.since(first.and_time(NaiveTime::MIN));
        }
        if let Some(last) = last {
            let end_of_day =
                NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
            frame = frame.until(last.and_time(end_of_day));
        }
        frame
    }

    /// The `n` most recent rows.
    pub fn latest(&self, n: usize) -> HistoryLazyFrame {
        let n = IdxSize::try_from(n).unwrap_or(IdxSize::MAX);
        HistoryLazyFrame::new(self.frame.clone().tail(n))
    }
}
