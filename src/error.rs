use crate::forecast_data::error::ForecastDataError;
use crate::history::error::HistoryError;
use crate::sites::error::SiteTableError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastHistoryError {
    #[error(transparent)]
    ForecastData(#[from] ForecastDataError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    SiteTable(#[from] SiteTableError),

    #[error("Failed to update {job} for site '{site}'")]
    JobFailed {
        site: String,
        job: String,
        #[source]
        source: Box<ForecastHistoryError>,
    },

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine the default output directory")]
    OutputDirResolution,
}
