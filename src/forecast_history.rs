//! The main entry point: downloads forecasts for sites and appends them to their
//! historical logs.

use crate::error::ForecastHistoryError;
use crate::forecast_data::fetcher::ForecastFetcher;
use crate::forecast_data::ncss::NcssClient;
use crate::forecast_data::source::ForecastSource;
use crate::history::error::HistoryError;
use crate::history::history_frame::HistoryLazyFrame;
use crate::history::store::HistoryStore;
use crate::solar::irradiance::IrradianceModel;
use crate::types::forecast_run::value_column_names;
use crate::types::horizon::ForecastJob;
use crate::types::site::Site;
use crate::types::window::IndexTimezone;
use crate::utils::{ensure_dir_exists, get_default_output_dir};
use bon::bon;
use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of appending one forecast to one log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub site: String,
    pub job: String,
    pub model: String,
    /// Nominal hours between the model's own outputs, before hourly resampling.
    pub native_step_hours: u32,
    pub path: PathBuf,
    pub rows_appended: usize,
    pub total_rows: usize,
}

/// A job that failed while the run kept going.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFailure {
    pub site: String,
    pub job: String,
    pub error: String,
}

/// Summary of a [`ForecastHistory::run`] over many sites and jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub outcomes: Vec<UpdateOutcome>,
    pub failures: Vec<JobFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Downloads forecasts and maintains one historical log per site and job.
///
/// ```no_run
/// use forecast_history::{ForecastHistory, ForecastJob, LatLon, Site, WeatherModel};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let history = ForecastHistory::new().await?;
/// let site = Site::new("Mill Creek", LatLon(40.0, -75.0), chrono_tz::America::New_York);
///
/// let outcome = history
///     .update()
///     .site(&site)
///     .job(&ForecastJob::new(1, WeatherModel::Hrrr))
///     .call()
///     .await?;
/// println!("{} now holds {} rows", outcome.path.display(), outcome.total_rows);
/// # Ok(())
/// # }
/// ```
pub struct ForecastHistory<S = NcssClient> {
    fetcher: ForecastFetcher<S>,
    store: HistoryStore,
    index_timezone: IndexTimezone,
}

impl ForecastHistory<NcssClient> {
    /// Uses the public THREDDS server and the default output directory.
    pub async fn new() -> Result<Self, ForecastHistoryError> {
        let output_folder = get_default_output_dir().ok_or(ForecastHistoryError::OutputDirResolution)?;
        Self::with_output_folder(output_folder).await
    }

    /// Uses the public THREDDS server and writes logs to `output_folder`.
    pub async fn with_output_folder(output_folder: PathBuf) -> Result<Self, ForecastHistoryError> {
        let client = NcssClient::builder().build()?;
        Self::with_source(client, output_folder).await
    }
}

#[bon]
impl<S: ForecastSource> ForecastHistory<S> {
    /// Reads forecasts from `source` and writes logs to `output_folder`, creating
    /// the folder if needed.
    pub async fn with_source(source: S, output_folder: PathBuf) -> Result<Self, ForecastHistoryError> {
        ensure_dir_exists(&output_folder)
            .await
            .map_err(|e| ForecastHistoryError::OutputDirCreation(output_folder.clone(), e))?;
        Ok(Self {
            fetcher: ForecastFetcher::new(source),
            store: HistoryStore::new(output_folder),
            index_timezone: IndexTimezone::default(),
        })
    }

    /// Sets how the `Date` index of newly appended rows is written.
    pub fn with_index_timezone(mut self, index_timezone: IndexTimezone) -> Self {
        self.index_timezone = index_timezone;
        self
    }

    /// Sets how cloud cover is converted into irradiance.
    pub fn with_irradiance_model(mut self, irradiance_model: IrradianceModel) -> Self {
        self.fetcher = self.fetcher.with_irradiance_model(irradiance_model);
        self
    }

    pub fn output_folder(&self) -> &Path {
        self.store.dir()
    }

    pub fn index_timezone(&self) -> IndexTimezone {
        self.index_timezone
    }

    /// Downloads one forecast and appends it to its log.
    ///
    /// `today` defaults to the current local date; the job's horizon day is counted
    /// from it.
    #[builder]
    pub async fn update(
        &self,
        site: &Site,
        job: &ForecastJob,
        today: Option<NaiveDate>,
    ) -> Result<UpdateOutcome, ForecastHistoryError> {
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let path = self.store.path_for(site, job);
        let past = self
            .store
            .load(&path, &value_column_names(&site.name))
            .await?;

        let run = self.fetcher.fetch_run(site, job, today).await?;
        let new = run
            .to_dataframe(self.index_timezone)
            .map_err(HistoryError::from)?;
        let merged = HistoryStore::append(past, new)?;
        let total_rows = merged.height();
        self.store.write(merged, &path).await?;

        Ok(UpdateOutcome {
            site: site.name.clone(),
            job: job.label().to_string(),
            model: job.model().to_string(),
            native_step_hours: job.model().native_step_hours(),
            path,
            rows_appended: run.len(),
            total_rows,
        })
    }

    /// Updates every `job` for every site, one after another, sites in the order
    /// given. Jobs default to [`ForecastJob::defaults`].
    ///
    /// The first failure aborts the run unless `keep_going` is set, in which case
    /// failures are logged and collected in the report.
    #[builder]
    pub async fn run(
        &self,
        sites: &[Site],
        jobs: Option<&[ForecastJob]>,
        today: Option<NaiveDate>,
        keep_going: Option<bool>,
    ) -> Result<RunReport, ForecastHistoryError> {
        let started_at = Utc::now();
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let jobs = jobs.map(<[ForecastJob]>::to_vec).unwrap_or_else(ForecastJob::defaults);
        let keep_going = keep_going.unwrap_or(false);

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for site in sites {
            for job in &jobs {
                match self.update().site(site).job(job).today(today).call().await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) if keep_going => {
                        warn!("Skipping {} for {}: {}", job, site.name, error_chain(&e));
                        failures.push(JobFailure {
                            site: site.name.clone(),
                            job: job.label().to_string(),
                            error: error_chain(&e),
                        });
                    }
                    Err(e) => {
                        return Err(ForecastHistoryError::JobFailed {
                            site: site.name.clone(),
                            job: job.label().to_string(),
                            source: Box::new(e),
                        })
                    }
                }
            }
        }

        info!(
            "Run for {} finished: {} logs updated, {} failed",
            today,
            outcomes.len(),
            failures.len()
        );
        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            today,
            outcomes,
            failures,
        })
    }

    /// Opens the log of `job` at `site`, or `None` if nothing was recorded yet.
    #[builder]
    pub async fn history(
        &self,
        site: &Site,
        job: &ForecastJob,
    ) -> Result<Option<HistoryLazyFrame>, ForecastHistoryError> {
        let path = self.store.path_for(site, job);
        let frame = self
            .store
            .load(&path, &value_column_names(&site.name))
            .await?;
        Ok(frame.map(HistoryLazyFrame::new))
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
