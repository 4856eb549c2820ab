use crate::forecast_data::error::ForecastDataError;
use crate::forecast_data::processing::process_samples;
use crate::forecast_data::resample::resample_hourly;
use crate::forecast_data::source::ForecastSource;
use crate::solar::irradiance::IrradianceModel;
use crate::types::forecast_record::ForecastRecord;
use crate::types::forecast_run::ForecastRun;
use crate::types::horizon::ForecastJob;
use crate::types::site::Site;
use crate::types::window::ForecastWindow;
use chrono::NaiveDate;
use log::{debug, info};

/// Assembles hourly [`ForecastRun`]s from a [`ForecastSource`].
pub struct ForecastFetcher<S> {
    source: S,
    irradiance_model: IrradianceModel,
}

impl<S: ForecastSource> ForecastFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            irradiance_model: IrradianceModel::default(),
        }
    }

    pub fn with_irradiance_model(mut self, irradiance_model: IrradianceModel) -> Self {
        self.irradiance_model = irradiance_model;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn irradiance_model(&self) -> IrradianceModel {
        self.irradiance_model
    }

    /// Downloads the forecast for `job` at `site`, for the day `job` points at
    /// relative to `today` (a date on the site's local calendar).
    ///
    /// A response that leaves no hourly row with any value is an
    /// [`ForecastDataError::EmptyResponse`].
    pub async fn fetch_run(
        &self,
        site: &Site,
        job: &ForecastJob,
        today: NaiveDate,
    ) -> Result<ForecastRun, ForecastDataError> {
        let model = job.model();
        let window = ForecastWindow::for_day(today, job.day_offset(), site.timezone);

        let samples = self
            .source
            .fetch_samples(model, site.location, &window)
            .await?;
        debug!(
            "{} returned {} samples for {} (nominal step {}h)",
            model,
            samples.len(),
            site.name,
            model.native_step_hours()
        );
        let processed = process_samples(model, self.irradiance_model, site.location, &samples)?;
        let hourly = resample_hourly(&processed);
        if !hourly.iter().any(ForecastRecord::has_values) {
            return Err(ForecastDataError::EmptyResponse {
                model,
                site: site.name.clone(),
            });
        }
        info!("{} {} download complete", site.name, model);

        Ok(ForecastRun::new(site.clone(), job.clone(), hourly))
    }
}
