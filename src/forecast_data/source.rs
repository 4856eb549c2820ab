use crate::forecast_data::error::ForecastDataError;
use crate::types::model::WeatherModel;
use crate::types::raw_sample::RawSample;
use crate::types::site::LatLon;
use crate::types::window::ForecastWindow;

/// Something that can hand out raw model output for a point and a time window.
///
/// [`crate::NcssClient`] talks to a THREDDS server; tests plug in fixed data.
#[allow(async_fn_in_trait)]
pub trait ForecastSource {
    /// Returns the samples of `model` at `location` within `window`, sorted by time.
    async fn fetch_samples(
        &self,
        model: WeatherModel,
        location: LatLon,
        window: &ForecastWindow,
    ) -> Result<Vec<RawSample>, ForecastDataError>;
}
