use crate::types::model::WeatherModel;
use chrono::{DateTime, Utc};
use polars::error::PolarsError;
use spa_sra::errors::SpaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastDataError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid service URL '{0}'")]
    InvalidUrl(String),

    #[error("Data download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Response from {url} exceeded {limit} bytes")]
    ResponseTooLarge { url: String, limit: u64 },

    // Errors during CSV reading (inside blocking task)
    #[error("I/O error processing CSV data for model {model}")]
    CsvReadIo {
        model: WeatherModel,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error processing CSV data for model {model}")]
    CsvReadPolars {
        model: WeatherModel,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Missing required column '{column}' in {model} response")]
    MissingColumn { model: WeatherModel, column: String },

    #[error("Could not parse timestamp '{value}' in {model} response")]
    TimestampParse { model: WeatherModel, value: String },

    #[error("Sun position calculation failed for {0}")]
    SolarPosition(DateTime<Utc>, #[source] SpaError),

    #[error("{model} returned no forecast rows for {site}")]
    EmptyResponse { model: WeatherModel, site: String },
}
