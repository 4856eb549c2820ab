use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create history directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to check for history log '{0}'")]
    Access(PathBuf, #[source] std::io::Error),

    #[error("Failed to read history log '{0}'")]
    Read(PathBuf, #[source] PolarsError),

    #[error("History log '{path}' has no '{column}' column")]
    SchemaMismatch { path: PathBuf, column: String },

    #[error("Failed to create temporary file next to '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode history log '{0}'")]
    Write(PathBuf, #[source] PolarsError),

    #[error("Failed to replace history log '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
