//! Reads, extends and rewrites the per-site historical forecast logs.

use crate::history::error::HistoryError;
use crate::types::forecast_run::DATE_COLUMN;
use crate::types::horizon::ForecastJob;
use crate::types::site::Site;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

/// Datetime format of the `Date` column on disk.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FILE_SUFFIX: &str = "historical_forecasts.csv";

/// A directory of historical logs, one CSV file per site and forecast job.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<lowercase site>_<job label>_historical_forecasts.csv` inside the store.
    pub fn path_for(&self, site: &Site, job: &ForecastJob) -> PathBuf {
        self.dir
            .join(format!("{}_{}_{}", site.file_stem(), job.label(), FILE_SUFFIX))
    }

    /// Loads an existing log with `Date` as millisecond datetimes followed by
    /// `value_columns` as `Float64`, in that order. Returns `None` if there is no
    /// file at `path` yet; failing to check is an error.
    pub async fn load(
        &self,
        path: &Path,
        value_columns: &[String],
    ) -> Result<Option<LazyFrame>, HistoryError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| HistoryError::Access(path.to_path_buf(), e))?;
        if !exists {
            info!("No history at {}, starting a new log", path.display());
            return Ok(None);
        }

        let path_buf = path.to_path_buf();
        let value_columns = value_columns.to_vec();
        let df = task::spawn_blocking(move || read_log(&path_buf, &value_columns)).await??;
        debug!("Loaded {} rows from {}", df.height(), path.display());
        Ok(Some(df.lazy()))
    }

    /// Stacks `new` under `past` and sorts by `Date`. Rows with equal timestamps
    /// keep their order, so earlier downloads stay ahead of later ones.
    pub fn append(past: Option<LazyFrame>, new: DataFrame) -> Result<DataFrame, HistoryError> {
        let combined = match past {
            Some(past) => concat([past, new.lazy()], UnionArgs::default())?,
            None => new.lazy(),
        };
        Ok(combined
            .sort(
                [DATE_COLUMN],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?)
    }

    /// Writes `df` to `path` through a temporary file in the same directory, so
    /// readers never observe a half-written log.
    pub async fn write(&self, df: DataFrame, path: &Path) -> Result<(), HistoryError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| HistoryError::DirCreation(self.dir.clone(), e))?;

        let dir = self.dir.clone();
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || write_log(df, &dir, &path_buf)).await??;
        Ok(())
    }
}

fn read_log(path: &Path, value_columns: &[String]) -> Result<DataFrame, HistoryError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| HistoryError::Read(path.to_path_buf(), e))?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let expected = std::iter::once(DATE_COLUMN).chain(value_columns.iter().map(String::as_str));
    for column in expected {
        if !names.iter().any(|name| name == column) {
            return Err(HistoryError::SchemaMismatch {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut columns = Vec::with_capacity(value_columns.len() + 1);
    columns.push(
        df.column(DATE_COLUMN)?
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
    );
    for name in value_columns {
        // Columns that were entirely empty are read back as strings.
        columns.push(df.column(name)?.cast(&DataType::Float64)?);
    }
    Ok(DataFrame::new(columns)?)
}

fn write_log(mut df: DataFrame, dir: &Path, path: &Path) -> Result<(), HistoryError> {
    let mut temp_file =
        NamedTempFile::new_in(dir).map_err(|e| HistoryError::TempFile(path.to_path_buf(), e))?;

    CsvWriter::new(&mut temp_file)
        .include_header(true)
        .with_datetime_format(Some(DATE_FORMAT.to_string()))
        .finish(&mut df)
        .map_err(|e| HistoryError::Write(path.to_path_buf(), e))?;

    temp_file
        .persist(path)
        .map_err(|e| HistoryError::Persist(path.to_path_buf(), e.error))?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::forecast_record::{ForecastRecord, ForecastVariable};
    use crate::types::forecast_run::{value_column_names, ForecastRun};
    use crate::types::model::WeatherModel;
    use crate::types::site::LatLon;
    use crate::types::window::IndexTimezone;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn site() -> Site {
        Site::new("Mill Creek", LatLon(40.0, -75.0), chrono_tz::America::New_York)
    }

    fn run_from(start: DateTime<Utc>, hours: i64, temp: f64) -> ForecastRun {
        let records = (0..hours)
            .map(|h| {
                ForecastRecord::empty(start + Duration::hours(h))
                    .with(ForecastVariable::TempAir, temp)
                    .with(ForecastVariable::Ghi, 0.0)
            })
            .collect();
        ForecastRun::new(site(), ForecastJob::new(1, WeatherModel::Hrrr), records)
    }

    fn dates_ms(df: &DataFrame) -> Vec<Option<i64>> {
        df.column(DATE_COLUMN)
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_path_for() {
        let store = HistoryStore::new("/data/logs");
        let path = store.path_for(&site(), &ForecastJob::new(2, WeatherModel::Gfs));
        assert_eq!(
            path,
            PathBuf::from("/data/logs/mill creek_day_2_gfs_historical_forecasts.csv")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = HistoryStore::new(dir.path());
        let path = store.path_for(&site(), &ForecastJob::new(1, WeatherModel::Hrrr));
        assert!(store.load(&path, &value_column_names("Mill Creek")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_reports_unreadable_location() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // A regular file standing where the log directory should be.
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory")?;

        let store = HistoryStore::new(&blocker);
        let path = store.path_for(&site(), &ForecastJob::new(1, WeatherModel::Hrrr));
        let result = store.load(&path, &value_column_names("Mill Creek")).await;
        assert!(
            matches!(&result, Err(HistoryError::Access(p, _)) if p == &path),
            "expected Access error, got {:?}",
            result.map(|frame| frame.is_some())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_write_then_append_keeps_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = HistoryStore::new(dir.path());
        let job = ForecastJob::new(1, WeatherModel::Hrrr);
        let path = store.path_for(&site(), &job);
        let columns = value_column_names("Mill Creek");

        // A later day is written first, then an earlier one is appended.
        let late = run_from(Utc.with_ymd_and_hms(2024, 7, 2, 4, 0, 0).unwrap(), 24, 25.0);
        let early = run_from(Utc.with_ymd_and_hms(2024, 7, 1, 4, 0, 0).unwrap(), 24, 20.0);

        let first = HistoryStore::append(None, late.to_dataframe(IndexTimezone::Local)?)?;
        store.write(first, &path).await?;

        let past = store.load(&path, &columns).await?;
        assert!(past.is_some());
        let merged = HistoryStore::append(past, early.to_dataframe(IndexTimezone::Local)?)?;
        assert_eq!(merged.height(), 48);

        let dates = dates_ms(&merged);
        assert!(dates.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(merged.column("Mill Creek: Tamb")?.f64()?.get(0), Some(20.0));
        assert_eq!(merged.column("Mill Creek: Tamb")?.f64()?.get(47), Some(25.0));

        store.write(merged, &path).await?;
        let reloaded = store.load(&path, &columns).await?.unwrap().collect()?;
        assert_eq!(reloaded.height(), 48);
        assert_eq!(reloaded.width(), 10);
        // Never-populated columns come back as nulls rather than strings.
        assert_eq!(reloaded.column("Mill Creek: DNI")?.dtype(), &DataType::Float64);
        assert_eq!(reloaded.column("Mill Creek: DNI")?.null_count(), 48);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_keep_download_order() -> Result<(), Box<dyn std::error::Error>>
    {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 4, 0, 0).unwrap();
        let first = run_from(start, 3, 10.0).to_dataframe(IndexTimezone::Utc)?;
        let second = run_from(start, 3, 11.0).to_dataframe(IndexTimezone::Utc)?;

        let merged = HistoryStore::append(Some(first.lazy()), second)?;
        let temps: Vec<Option<f64>> = merged.column("Mill Creek: Tamb")?.f64()?.into_iter().collect();
        assert_eq!(
            temps,
            [Some(10.0), Some(11.0), Some(10.0), Some(11.0), Some(10.0), Some(11.0)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("other_day_1_hrrr_historical_forecasts.csv");
        std::fs::write(&path, "Date,Other: Tamb\n2024-07-01 00:00:00,1.5\n")?;

        let store = HistoryStore::new(dir.path());
        let result = store.load(&path, &value_column_names("Mill Creek")).await;
        assert!(matches!(
            result,
            Err(HistoryError::SchemaMismatch { ref column, .. }) if column == "Mill Creek: Tamb"
        ));
        Ok(())
    }
}
