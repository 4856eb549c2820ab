use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteTableError {
    #[error("Failed to read site table '{0}'")]
    SiteTableRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse site table")]
    CsvParse(#[from] csv::Error),

    #[error("Site table is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Site '{site}' has an unknown timezone '{timezone}'")]
    InvalidTimezone { site: String, timezone: String },

    #[error("Site '{site}' has an invalid {field} '{value}'")]
    InvalidCoordinate {
        site: String,
        field: &'static str,
        value: String,
    },

    #[error("Site table contains no sites")]
    Empty,

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
