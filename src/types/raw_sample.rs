use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A quantity as published by a forecast model, before unit conversion or derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawVariable {
    /// Air temperature in Kelvin.
    Temperature,
    /// Eastward wind component, m/s.
    WindU,
    /// Northward wind component, m/s.
    WindV,
    /// Wind speed, m/s.
    WindSpeed,
    /// Wind gust, m/s.
    WindGust,
    /// Cloud cover fractions, percent.
    TotalClouds,
    LowClouds,
    MidClouds,
    HighClouds,
}

/// One timestamp of model output at a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub time: DateTime<Utc>,
    pub values: HashMap<RawVariable, f64>,
}

impl RawSample {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, variable: RawVariable, value: f64) -> Self {
        self.values.insert(variable, value);
        self
    }

    pub fn get(&self, variable: RawVariable) -> Option<f64> {
        self.values.get(&variable).copied()
    }

    /// Sets `variable` unless a value is already present. NaN is treated as missing.
    pub fn fill(&mut self, variable: RawVariable, value: f64) {
        if value.is_nan() {
            return;
        }
        self.values.entry(variable).or_insert(value);
    }
}
