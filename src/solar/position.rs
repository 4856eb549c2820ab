//! Sun position from NREL's Solar Position Algorithm.

use crate::types::site::LatLon;
use chrono::{DateTime, Utc};
use spa_sra::errors::SpaError;
use spa_sra::spa::{Function, Input, SpaData};

/// Annual average pressure at sea level, millibars.
const PRESSURE_MBAR: f64 = 1013.25;
/// Annual average temperature used for the refraction correction, degrees Celsius.
const TEMPERATURE_C: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Geometric zenith angle, degrees.
    pub zenith: f64,
    /// Zenith angle corrected for atmospheric refraction, degrees.
    pub apparent_zenith: f64,
    /// Apparent elevation above the horizon, degrees.
    pub elevation: f64,
    /// Azimuth clockwise from north, degrees.
    pub azimuth: f64,
}

impl SolarPosition {
    /// Topocentric sun position at sea level for `location` at `time`.
    pub fn at(time: DateTime<Utc>, location: LatLon) -> Result<Self, SpaError> {
        let mut input = Input::from_date_time(time);
        input.latitude = location.latitude();
        input.longitude = location.longitude();
        input.pressure = PRESSURE_MBAR;
        input.temperature = TEMPERATURE_C;
        input.elevation = 0.0;
        input.function = Function::SpaZa;

        let mut spa = SpaData::new(input);
        spa.spa_calculate()?;

        Ok(Self {
            zenith: 90.0 - spa.spa_za.e0,
            apparent_zenith: spa.spa_za.zenith,
            elevation: spa.spa_za.e,
            azimuth: spa.spa_za.azimuth,
        })
    }

    pub fn is_above_horizon(&self) -> bool {
        self.apparent_zenith < 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_equinox_noon_on_equator_is_near_zenith() -> Result<(), SpaError> {
        // Solar noon at lon 0 on the March equinox is a few minutes after 12:00 UTC.
        let time = Utc.with_ymd_and_hms(2024, 3, 20, 12, 7, 0).unwrap();
        let pos = SolarPosition::at(time, LatLon(0.0, 0.0))?;
        assert!(pos.zenith < 1.5, "zenith was {}", pos.zenith);
        Ok(())
    }

    #[test]
    fn test_summer_vs_winter_noon_elevation() -> Result<(), SpaError> {
        let stockholm = LatLon(59.33, 18.06);
        let summer = SolarPosition::at(Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 0).unwrap(), stockholm)?;
        let winter = SolarPosition::at(Utc.with_ymd_and_hms(2024, 12, 21, 11, 0, 0).unwrap(), stockholm)?;
        assert!(summer.elevation > 50.0, "summer elevation {}", summer.elevation);
        assert!(winter.elevation < 10.0, "winter elevation {}", winter.elevation);
        // Roughly due south around local solar noon.
        assert!((summer.azimuth - 180.0).abs() < 15.0, "azimuth {}", summer.azimuth);
        Ok(())
    }

    #[test]
    fn test_night_is_below_horizon() -> Result<(), SpaError> {
        let denver = LatLon(39.74, -104.99);
        let local_midnight = Utc.with_ymd_and_hms(2024, 6, 21, 6, 0, 0).unwrap();
        let pos = SolarPosition::at(local_midnight, denver)?;
        assert!(!pos.is_above_horizon());
        assert!(pos.elevation < -20.0);
        Ok(())
    }

    #[test]
    fn test_refraction_lifts_the_sun_near_the_horizon() -> Result<(), SpaError> {
        // Sunset in Denver on the summer solstice is around 02:30 UTC.
        let denver = LatLon(39.74, -104.99);
        let dusk = Utc.with_ymd_and_hms(2024, 6, 22, 2, 20, 0).unwrap();
        let pos = SolarPosition::at(dusk, denver)?;
        let lift = pos.zenith - pos.apparent_zenith;
        assert!(lift > 0.1 && lift < 1.0, "refraction {lift}");

        let noon = SolarPosition::at(Utc.with_ymd_and_hms(2024, 6, 21, 19, 0, 0).unwrap(), denver)?;
        assert!((noon.zenith - noon.apparent_zenith).abs() < 0.02);
        Ok(())
    }
}
