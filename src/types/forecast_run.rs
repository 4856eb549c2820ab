//! A single downloaded forecast, ready to be appended to a historical log.

use crate::types::forecast_record::{ForecastRecord, ForecastVariable};
use crate::types::horizon::ForecastJob;
use crate::types::site::Site;
use crate::types::window::IndexTimezone;
use chrono::NaiveDateTime;
use polars::prelude::*;

/// Name of the index column of every historical log.
pub const DATE_COLUMN: &str = "Date";

/// Column names of a historical log for `site`, excluding [`DATE_COLUMN`].
pub fn value_column_names(site: &str) -> Vec<String> {
    ForecastVariable::ALL
        .iter()
        .map(|variable| variable.column_name(site))
        .collect()
}

/// An hourly forecast for one site from one model over one horizon window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub site: Site,
    pub job: ForecastJob,
    pub records: Vec<ForecastRecord>,
}

impl ForecastRun {
    pub fn new(site: Site, job: ForecastJob, records: Vec<ForecastRecord>) -> Self {
        Self { site, job, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds the frame that gets appended to the log: a naive `Date` column in the
    /// requested representation followed by one `Float64` column per variable,
    /// named after the site.
    pub fn to_dataframe(&self, index_timezone: IndexTimezone) -> PolarsResult<DataFrame> {
        let dates: Vec<NaiveDateTime> = self
            .records
            .iter()
            .map(|record| index_timezone.naive(record.time, self.site.timezone))
            .collect();

        let mut columns = Vec::with_capacity(ForecastVariable::COUNT + 1);
        columns.push(
            Column::new(DATE_COLUMN.into(), dates)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        );
        for variable in ForecastVariable::ALL {
            let values: Vec<Option<f64>> =
                self.records.iter().map(|record| record.get(variable)).collect();
            columns.push(Column::new(
                variable.column_name(&self.site.name).into(),
                values,
            ));
        }

        DataFrame::new(columns)
    }
}
