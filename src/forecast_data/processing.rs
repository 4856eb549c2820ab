//! Turns raw model output into the processed variables stored in the logs.

use crate::forecast_data::error::ForecastDataError;
use crate::solar::irradiance::{cloud_cover_to_irradiance, IrradianceModel};
use crate::solar::position::SolarPosition;
use crate::types::forecast_record::{ForecastRecord, ForecastVariable};
use crate::types::model::{WeatherModel, WindSource};
use crate::types::raw_sample::{RawSample, RawVariable};
use crate::types::site::LatLon;
use chrono::Datelike;

const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Horizontal wind speed from its u and v components.
pub fn uv_to_speed(u: f64, v: f64) -> f64 {
    u.hypot(v)
}

fn wind_speed(model: WeatherModel, sample: &RawSample) -> Option<f64> {
    match model.wind_source() {
        WindSource::Components => Some(uv_to_speed(
            sample.get(RawVariable::WindU)?,
            sample.get(RawVariable::WindV)?,
        )),
        WindSource::Gust => sample.get(RawVariable::WindGust),
        WindSource::Direct => sample.get(RawVariable::WindSpeed),
    }
}

/// Processes a single raw sample taken at `location`.
pub fn process_sample(
    model: WeatherModel,
    irradiance_model: IrradianceModel,
    location: LatLon,
    sample: &RawSample,
) -> Result<ForecastRecord, ForecastDataError> {
    let mut record = ForecastRecord::empty(sample.time);

    record.set(
        ForecastVariable::TempAir,
        sample.get(RawVariable::Temperature).map(kelvin_to_celsius),
    );
    record.set(ForecastVariable::WindSpeed, wind_speed(model, sample));

    let total_clouds = sample.get(RawVariable::TotalClouds);
    record.set(ForecastVariable::TotalClouds, total_clouds);
    record.set(ForecastVariable::LowClouds, sample.get(RawVariable::LowClouds));
    record.set(ForecastVariable::MidClouds, sample.get(RawVariable::MidClouds));
    record.set(ForecastVariable::HighClouds, sample.get(RawVariable::HighClouds));

    if let Some(total_clouds) = total_clouds {
        let position = SolarPosition::at(sample.time, location)
            .map_err(|e| ForecastDataError::SolarPosition(sample.time, e))?;
        let irradiance = cloud_cover_to_irradiance(
            irradiance_model,
            &position,
            sample.time.ordinal(),
            total_clouds,
        );
        record.set(ForecastVariable::Ghi, Some(irradiance.ghi));
        record.set(ForecastVariable::Dni, Some(irradiance.dni));
        record.set(ForecastVariable::Dhi, Some(irradiance.dhi));
    }

    Ok(record)
}

pub fn process_samples(
    model: WeatherModel,
    irradiance_model: IrradianceModel,
    location: LatLon,
    samples: &[RawSample],
) -> Result<Vec<ForecastRecord>, ForecastDataError> {
    samples
        .iter()
        .map(|sample| process_sample(model, irradiance_model, location, sample))
        .collect()
}
