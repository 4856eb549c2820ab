//! Defines the numerical weather prediction models that forecasts can be requested from,
//! together with the THREDDS dataset and variable names each model publishes.

use crate::types::raw_sample::RawVariable;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A numerical weather prediction model served by the NCEP THREDDS catalog.
///
/// Models differ in spatial coverage, output step, forecast length and in which
/// variables they provide. The variable names differ between models even when
/// they describe the same physical quantity, see [`WeatherModel::variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeatherModel {
    /// High Resolution Rapid Refresh. Hourly output for roughly 18 hours (48 on synoptic runs), CONUS only.
    Hrrr,
    /// Rapid Refresh, the parent model of HRRR. Hourly output for roughly 21 hours.
    Rap,
    /// North American Mesoscale. Hourly output for 36 hours, then 3-hourly up to 84 hours.
    Nam,
    /// National Digital Forecast Database. Hourly for 48 hours, then 3- and 6-hourly.
    Ndfd,
    /// Global Forecast System. 3-hourly output for up to 16 days, worldwide.
    Gfs,
}

/// How a model's wind speed column is derived from what it publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSource {
    /// `sqrt(u^2 + v^2)` from the horizontal wind components.
    Components,
    /// The surface wind gust is used as the wind speed.
    Gust,
    /// The model publishes a wind speed directly.
    Direct,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown weather model '{0}', expected one of HRRR, RAP, NAM, NDFD, GFS")]
pub struct UnknownModel(pub String);

impl WeatherModel {
    pub const ALL: [WeatherModel; 5] = [
        WeatherModel::Hrrr,
        WeatherModel::Rap,
        WeatherModel::Nam,
        WeatherModel::Ndfd,
        WeatherModel::Gfs,
    ];

    /// Short upper-case name of the model, as used in logs and the site table.
    pub fn name(&self) -> &'static str {
        match self {
            WeatherModel::Hrrr => "HRRR",
            WeatherModel::Rap => "RAP",
            WeatherModel::Nam => "NAM",
            WeatherModel::Ndfd => "NDFD",
            WeatherModel::Gfs => "GFS",
        }
    }

    /// Dataset path under `thredds/ncss/grid/` for the "Best" time series of the model.
    pub fn dataset(&self) -> &'static str {
        match self {
            WeatherModel::Hrrr => "grib/NCEP/HRRR/CONUS_2p5km/Best",
            WeatherModel::Rap => "grib/NCEP/RAP/CONUS_20km/Best",
            WeatherModel::Nam => "grib/NCEP/NAM/CONUS_12km/Best",
            WeatherModel::Ndfd => "grib/NCEP/NDFD/NWS/CONUS/CONDUIT/Best",
            WeatherModel::Gfs => "grib/NCEP/GFS/Global_0p5deg/Best",
        }
    }

    /// Nominal number of hours between two model outputs in the first forecast days.
    pub fn native_step_hours(&self) -> u32 {
        match self {
            WeatherModel::Gfs => 3,
            _ => 1,
        }
    }

    pub fn wind_source(&self) -> WindSource {
        match self {
            WeatherModel::Hrrr | WeatherModel::Gfs => WindSource::Components,
            WeatherModel::Rap | WeatherModel::Nam => WindSource::Gust,
            WeatherModel::Ndfd => WindSource::Direct,
        }
    }

    /// The raw variables requested for this model and their NCSS variable names.
    pub fn variables(&self) -> Vec<(RawVariable, &'static str)> {
        use RawVariable::*;
        match self {
            WeatherModel::Hrrr => vec![
                (Temperature, "Temperature_height_above_ground"),
                (WindU, "u-component_of_wind_height_above_ground"),
                (WindV, "v-component_of_wind_height_above_ground"),
                (WindGust, "Wind_speed_gust_surface"),
                (TotalClouds, "Total_cloud_cover_entire_atmosphere"),
                (LowClouds, "Low_cloud_cover_low_cloud"),
                (MidClouds, "Medium_cloud_cover_middle_cloud"),
                (HighClouds, "High_cloud_cover_high_cloud"),
            ],
            WeatherModel::Rap => vec![
                (Temperature, "Temperature_surface"),
                (WindGust, "Wind_speed_gust_surface"),
                (TotalClouds, "Total_cloud_cover_entire_atmosphere"),
                (LowClouds, "Low_cloud_cover_low_cloud"),
                (MidClouds, "Medium_cloud_cover_middle_cloud"),
                (HighClouds, "High_cloud_cover_high_cloud"),
            ],
            WeatherModel::Nam => vec![
                (Temperature, "Temperature_surface"),
                (WindGust, "Wind_speed_gust_surface"),
                (TotalClouds, "Total_cloud_cover_entire_atmosphere_single_layer"),
                (LowClouds, "Low_cloud_cover_low_cloud"),
                (MidClouds, "Medium_cloud_cover_middle_cloud"),
                (HighClouds, "High_cloud_cover_high_cloud"),
            ],
            WeatherModel::Ndfd => vec![
                (Temperature, "Temperature_height_above_ground"),
                (WindSpeed, "Wind_speed_height_above_ground"),
                (WindGust, "Wind_speed_gust_height_above_ground"),
                (TotalClouds, "Total_cloud_cover_surface"),
            ],
            WeatherModel::Gfs => vec![
                (Temperature, "Temperature_surface"),
                (WindU, "u-component_of_wind_height_above_ground"),
                (WindV, "v-component_of_wind_height_above_ground"),
                (WindGust, "Wind_speed_gust_surface"),
                (
                    TotalClouds,
                    "Total_cloud_cover_entire_atmosphere_Mixed_intervals_Average",
                ),
                (
                    LowClouds,
                    "Total_cloud_cover_low_cloud_Mixed_intervals_Average",
                ),
                (
                    MidClouds,
                    "Total_cloud_cover_middle_cloud_Mixed_intervals_Average",
                ),
                (
                    HighClouds,
                    "Total_cloud_cover_high_cloud_Mixed_intervals_Average",
                ),
            ],
        }
    }

    /// Looks up which raw variable an NCSS column name refers to for this model.
    pub(crate) fn raw_variable_for(&self, ncss_name: &str) -> Option<RawVariable> {
        self.variables()
            .into_iter()
            .find(|(_, name)| *name == ncss_name)
            .map(|(variable, _)| variable)
    }
}

/// # Examples
///
/// ```
/// use forecast_history::WeatherModel;
///
/// assert_eq!(WeatherModel::Hrrr.to_string(), "HRRR");
/// ```
impl fmt::Display for WeatherModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parses a model name case-insensitively.
///
/// ```
/// use forecast_history::WeatherModel;
///
/// assert_eq!("gfs".parse::<WeatherModel>().unwrap(), WeatherModel::Gfs);
/// assert!("ECMWF".parse::<WeatherModel>().is_err());
/// ```
impl FromStr for WeatherModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeatherModel::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("hrrr".parse(), Ok(WeatherModel::Hrrr));
        assert_eq!(" Rap ".parse(), Ok(WeatherModel::Rap));
        assert_eq!("NDFD".parse(), Ok(WeatherModel::Ndfd));
        assert_eq!(
            "icon".parse::<WeatherModel>(),
            Err(UnknownModel("icon".to_string()))
        );
    }

    #[test]
    fn test_every_model_requests_temperature_and_total_clouds() {
        for model in WeatherModel::ALL {
            let vars: Vec<RawVariable> = model.variables().into_iter().map(|(v, _)| v).collect();
            assert!(vars.contains(&RawVariable::Temperature), "{model}");
            assert!(vars.contains(&RawVariable::TotalClouds), "{model}");
        }
    }

    #[test]
    fn test_wind_inputs_match_wind_source() {
        for model in WeatherModel::ALL {
            let vars: Vec<RawVariable> = model.variables().into_iter().map(|(v, _)| v).collect();
            match model.wind_source() {
                WindSource::Components => {
                    assert!(vars.contains(&RawVariable::WindU));
                    assert!(vars.contains(&RawVariable::WindV));
                }
                WindSource::Gust => assert!(vars.contains(&RawVariable::WindGust)),
                WindSource::Direct => assert!(vars.contains(&RawVariable::WindSpeed)),
            }
        }
    }

    #[test]
    fn test_native_steps() {
        assert_eq!(WeatherModel::Gfs.native_step_hours(), 3);
        assert_eq!(WeatherModel::Hrrr.native_step_hours(), 1);
    }

    #[test]
    fn test_raw_variable_lookup() {
        assert_eq!(
            WeatherModel::Nam.raw_variable_for("Total_cloud_cover_entire_atmosphere_single_layer"),
            Some(RawVariable::TotalClouds)
        );
        assert_eq!(WeatherModel::Nam.raw_variable_for("Pressure_surface"), None);
    }
}
