//! Forecast jobs: which model to ask, and how many days ahead.

use crate::types::model::WeatherModel;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid forecast label '{label}': {reason} (expected e.g. 'day_1_hrrr')")]
pub struct InvalidJobLabel {
    pub label: String,
    pub reason: String,
}

/// One forecast configuration applied to every site, e.g. `day_2_gfs`.
///
/// The label doubles as the horizon part of the historical log file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastJob {
    label: String,
    horizon_day: u32,
    model: WeatherModel,
}

impl ForecastJob {
    /// Creates a job for forecast day `horizon_day` (1 = today) from `model`.
    ///
    /// Day numbering starts at 1, so a `horizon_day` of 0 is treated as 1 and
    /// labelled `day_1_<model>`. Parsing a label rejects day 0 instead.
    ///
    /// ```
    /// use forecast_history::{ForecastJob, WeatherModel};
    ///
    /// let job = ForecastJob::new(2, WeatherModel::Gfs);
    /// assert_eq!(job.label(), "day_2_gfs");
    /// assert_eq!(job.day_offset(), 1);
    /// ```
    pub fn new(horizon_day: u32, model: WeatherModel) -> Self {
        let horizon_day = horizon_day.max(1);
        Self {
            label: format!("day_{}_{}", horizon_day, model.name().to_lowercase()),
            horizon_day,
            model,
        }
    }

    /// The forecast list used when none is configured.
    pub fn defaults() -> Vec<ForecastJob> {
        vec![
            ForecastJob::new(1, WeatherModel::Hrrr),
            ForecastJob::new(1, WeatherModel::Rap),
            ForecastJob::new(1, WeatherModel::Gfs),
            ForecastJob::new(2, WeatherModel::Gfs),
        ]
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn horizon_day(&self) -> u32 {
        self.horizon_day
    }

    /// Days between today and the forecast day.
    pub fn day_offset(&self) -> u32 {
        self.horizon_day - 1
    }

    pub fn model(&self) -> WeatherModel {
        self.model
    }
}

impl fmt::Display for ForecastJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for ForecastJob {
    type Err = InvalidJobLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| InvalidJobLabel {
            label: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.trim().splitn(3, '_');
        let (Some(prefix), Some(day), Some(model)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected three '_' separated parts"));
        };
        if !prefix.eq_ignore_ascii_case("day") {
            return Err(invalid("label must start with 'day'"));
        }
        let horizon_day: u32 = day
            .parse()
            .map_err(|_| invalid("day must be a positive integer"))?;
        if horizon_day == 0 {
            return Err(invalid("day numbering starts at 1"));
        }
        let model = model
            .parse::<WeatherModel>()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(ForecastJob::new(horizon_day, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_forecast_list() {
        let labels: Vec<String> = ForecastJob::defaults()
            .iter()
            .map(|job| job.label().to_string())
            .collect();
        assert_eq!(labels, ["day_1_hrrr", "day_1_rap", "day_1_gfs", "day_2_gfs"]);
    }

    #[test]
    fn test_parse_label() {
        let job: ForecastJob = "day_2_gfs".parse().unwrap();
        assert_eq!(job.model(), WeatherModel::Gfs);
        assert_eq!(job.horizon_day(), 2);
        assert_eq!(job.day_offset(), 1);

        let job: ForecastJob = "Day_3_NAM".parse().unwrap();
        assert_eq!(job.label(), "day_3_nam");
    }

    #[test]
    fn test_day_zero_becomes_day_one() {
        let job = ForecastJob::new(0, WeatherModel::Gfs);
        assert_eq!(job.label(), "day_1_gfs");
        assert_eq!(job.horizon_day(), 1);
        assert_eq!(job.day_offset(), 0);
        assert_eq!(job, ForecastJob::new(1, WeatherModel::Gfs));
    }

    #[test]
    fn test_parse_rejects_bad_labels() {
        assert!("day_0_gfs".parse::<ForecastJob>().is_err());
        assert!("day_x_gfs".parse::<ForecastJob>().is_err());
        assert!("week_1_gfs".parse::<ForecastJob>().is_err());
        assert!("day_1".parse::<ForecastJob>().is_err());
        assert!("day_1_ecmwf".parse::<ForecastJob>().is_err());
    }
}
