//! Client for the THREDDS NetCDF Subset Service (NCSS), which serves NCEP model
//! output as point time series in CSV form.

use crate::forecast_data::error::ForecastDataError;
use crate::forecast_data::source::ForecastSource;
use crate::types::model::WeatherModel;
use crate::types::raw_sample::{RawSample, RawVariable};
use crate::types::site::LatLon;
use crate::types::window::ForecastWindow;
use bon::bon;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::{Client, Url};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::task;
use tokio_util::io::StreamReader;

pub const DEFAULT_BASE_URL: &str = "https://thredds.ucar.edu";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// A day of hourly point data is a few kilobytes; anything near this is not a point series.
pub const MAX_RESPONSE_BYTES: u64 = 32 * 1024 * 1024;
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub struct NcssClient {
    base_url: String,
    max_response_bytes: u64,
    download_client: Client,
}

#[bon]
impl NcssClient {
    /// Creates a client for the THREDDS server at `base_url`
    /// (default [`DEFAULT_BASE_URL`]) with a per-request `timeout`. Response bodies
    /// above `max_response_bytes` (default [`MAX_RESPONSE_BYTES`]) are rejected.
    ///
    /// ```
    /// use forecast_history::NcssClient;
    /// use std::time::Duration;
    ///
    /// let client = NcssClient::builder()
    ///     .base_url("http://localhost:8080".to_string())
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:8080");
    /// ```
    #[builder]
    pub fn new(
        base_url: Option<String>,
        timeout: Option<Duration>,
        max_response_bytes: Option<u64>,
    ) -> Result<Self, ForecastDataError> {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&base_url).map_err(|_| ForecastDataError::InvalidUrl(base_url.clone()))?;

        let download_client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .map_err(ForecastDataError::ClientBuild)?;

        Ok(Self {
            base_url,
            max_response_bytes: max_response_bytes.unwrap_or(MAX_RESPONSE_BYTES),
            download_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the grid-as-point CSV query for `model` at `location` over `window`.
    pub fn request_url(
        &self,
        model: WeatherModel,
        location: LatLon,
        window: &ForecastWindow,
    ) -> Result<Url, ForecastDataError> {
        let raw = format!("{}/thredds/ncss/grid/{}", self.base_url, model.dataset());
        let mut url = Url::parse(&raw).map_err(|_| ForecastDataError::InvalidUrl(raw.clone()))?;
        {
            let mut query = url.query_pairs_mut();
            for (_, name) in model.variables() {
                query.append_pair("var", name);
            }
            query
                .append_pair("latitude", &location.latitude().to_string())
                .append_pair("longitude", &location.longitude().to_string())
                .append_pair("time_start", &window.start.format(TIME_FORMAT).to_string())
                .append_pair("time_end", &window.end.format(TIME_FORMAT).to_string())
                .append_pair("accept", "csv");
        }
        Ok(url)
    }

    /// Downloads the response body, refusing anything larger than the configured limit.
    async fn download(&self, url: &Url) -> Result<Vec<u8>, ForecastDataError> {
        debug!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ForecastDataError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ForecastDataError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ForecastDataError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream).take(self.max_response_bytes + 1);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;

        if body.len() as u64 > self.max_response_bytes {
            return Err(ForecastDataError::ResponseTooLarge {
                url: url.to_string(),
                limit: self.max_response_bytes,
            });
        }
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Parses a raw NCSS CSV body into a DataFrame using a blocking task.
    pub(crate) async fn csv_to_dataframe(
        bytes: Vec<u8>,
        model: WeatherModel,
    ) -> Result<DataFrame, ForecastDataError> {
        task::spawn_blocking(move || {
            let mut temp_file =
                NamedTempFile::new().map_err(|e| ForecastDataError::CsvReadIo { model, source: e })?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| ForecastDataError::CsvReadIo { model, source: e })?;
            temp_file
                .flush()
                .map_err(|e| ForecastDataError::CsvReadIo { model, source: e })?;

            CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .map_err(|e| ForecastDataError::CsvReadPolars { model, source: e })?
                .finish()
                .map_err(|e| ForecastDataError::CsvReadPolars { model, source: e })
        })
        .await?
    }
}

impl ForecastSource for NcssClient {
    async fn fetch_samples(
        &self,
        model: WeatherModel,
        location: LatLon,
        window: &ForecastWindow,
    ) -> Result<Vec<RawSample>, ForecastDataError> {
        let url = self.request_url(model, location, window)?;
        info!(
            "Requesting {} forecast at {} for {} .. {}",
            model, location, window.start, window.end
        );
        let bytes = self.download(&url).await?;
        let df = Self::csv_to_dataframe(bytes, model).await?;
        extract_samples(&df, model)
    }
}

/// Strips NCSS header decorations: `Temperature_surface[unit="K"]` -> `Temperature_surface`.
fn clean_header(name: &str) -> &str {
    name.split('[')
        .next()
        .unwrap_or(name)
        .trim()
        .trim_matches('"')
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Folds the rows of an NCSS response into one [`RawSample`] per timestamp.
///
/// A point request for variables on several vertical levels returns one row per
/// level; the first non-missing value for each variable is kept.
pub(crate) fn extract_samples(
    df: &DataFrame,
    model: WeatherModel,
) -> Result<Vec<RawSample>, ForecastDataError> {
    let mut time_column = None;
    let mut value_columns: Vec<(RawVariable, Vec<Option<f64>>)> = Vec::new();

    for column in df.get_columns() {
        let name = clean_header(column.name().as_str());
        if name.eq_ignore_ascii_case("time") || name.eq_ignore_ascii_case("date") {
            let as_text = column.cast(&DataType::String)?;
            let values: Vec<Option<String>> = as_text
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            time_column = Some(values);
        } else if let Some(variable) = model.raw_variable_for(name) {
            let as_float = column.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = as_float.f64()?.into_iter().collect();
            value_columns.push((variable, values));
        }
    }

    let times = time_column.ok_or_else(|| ForecastDataError::MissingColumn {
        model,
        column: "time".to_string(),
    })?;

    for (variable, name) in model.variables() {
        if !value_columns.iter().any(|(v, _)| *v == variable) {
            warn!("{} response has no '{}' column", model, name);
        }
    }

    let mut samples: BTreeMap<DateTime<Utc>, RawSample> = BTreeMap::new();
    for (row, time) in times.iter().enumerate() {
        let Some(time) = time else { continue };
        let time = parse_timestamp(time).ok_or_else(|| ForecastDataError::TimestampParse {
            model,
            value: time.clone(),
        })?;
        let sample = samples
            .entry(time)
            .or_insert_with(|| RawSample::new(time));
        for (variable, values) in &value_columns {
            if let Some(value) = values[row] {
                sample.fill(*variable, value);
            }
        }
    }

    Ok(samples.into_values().collect())
}
