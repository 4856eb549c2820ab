//! The processed, per-timestamp forecast values written to the historical logs.

use chrono::{DateTime, Utc};
use std::fmt;

/// A processed forecast variable. The declaration order is the column order of every
/// historical log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastVariable {
    /// Air temperature, degrees Celsius.
    TempAir,
    /// Wind speed, m/s.
    WindSpeed,
    /// Global horizontal irradiance, W/m2.
    Ghi,
    /// Direct normal irradiance, W/m2.
    Dni,
    /// Diffuse horizontal irradiance, W/m2.
    Dhi,
    /// Total cloud cover, percent.
    TotalClouds,
    /// Low cloud cover, percent.
    LowClouds,
    /// Mid cloud cover, percent.
    MidClouds,
    /// High cloud cover, percent.
    HighClouds,
}

impl ForecastVariable {
    pub const COUNT: usize = 9;

    pub const ALL: [ForecastVariable; Self::COUNT] = [
        ForecastVariable::TempAir,
        ForecastVariable::WindSpeed,
        ForecastVariable::Ghi,
        ForecastVariable::Dni,
        ForecastVariable::Dhi,
        ForecastVariable::TotalClouds,
        ForecastVariable::LowClouds,
        ForecastVariable::MidClouds,
        ForecastVariable::HighClouds,
    ];

    /// Suffix used in the log column name, `"<site>: <suffix>"`.
    pub fn column_suffix(&self) -> &'static str {
        match self {
            ForecastVariable::TempAir => "Tamb",
            ForecastVariable::WindSpeed => "Wind_Speed",
            ForecastVariable::Ghi => "GHI",
            ForecastVariable::Dni => "DNI",
            ForecastVariable::Dhi => "DHI",
            ForecastVariable::TotalClouds => "Total_Clouds",
            ForecastVariable::LowClouds => "Low_Clouds",
            ForecastVariable::MidClouds => "Mid_Clouds",
            ForecastVariable::HighClouds => "High_Clouds",
        }
    }

    /// Full column name for `site`.
    ///
    /// ```
    /// use forecast_history::ForecastVariable;
    ///
    /// assert_eq!(ForecastVariable::Ghi.column_name("Mill Creek"), "Mill Creek: GHI");
    /// ```
    pub fn column_name(&self, site: &str) -> String {
        format!("{}: {}", site, self.column_suffix())
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ForecastVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_suffix())
    }
}

/// Processed forecast values for a single timestamp. Missing values are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub time: DateTime<Utc>,
    values: [Option<f64>; ForecastVariable::COUNT],
}

impl ForecastRecord {
    pub fn empty(time: DateTime<Utc>) -> Self {
        Self {
            time,
            values: [None; ForecastVariable::COUNT],
        }
    }

    pub fn get(&self, variable: ForecastVariable) -> Option<f64> {
        self.values[variable.index()]
    }

    pub fn set(&mut self, variable: ForecastVariable, value: Option<f64>) {
        self.values[variable.index()] = value.filter(|v| !v.is_nan());
    }

    /// Whether at least one variable holds a value.
    pub fn has_values(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    pub fn with(mut self, variable: ForecastVariable, value: f64) -> Self {
        self.set(variable, Some(value));
        self
    }
}
