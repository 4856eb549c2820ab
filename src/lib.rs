mod error;
mod forecast_data;
mod forecast_history;
mod history;
mod sites;
mod solar;
mod types;
mod utils;

pub use error::ForecastHistoryError;
pub use forecast_history::*;

pub use forecast_data::error::ForecastDataError;
pub use forecast_data::fetcher::ForecastFetcher;
pub use forecast_data::ncss::{NcssClient, DEFAULT_BASE_URL};
pub use forecast_data::processing::{kelvin_to_celsius, process_sample, uv_to_speed};
pub use forecast_data::resample::{interpolate_linear, resample_hourly};
pub use forecast_data::source::ForecastSource;

pub use history::error::HistoryError;
pub use history::history_frame::HistoryLazyFrame;
pub use history::store::{HistoryStore, DATE_FORMAT};

pub use sites::error::SiteTableError;
pub use sites::site_table::SiteTable;

pub use solar::irradiance::{cloud_cover_to_irradiance, Irradiance, IrradianceModel};
pub use solar::position::SolarPosition;

pub use types::forecast_record::{ForecastRecord, ForecastVariable};
pub use types::forecast_run::{value_column_names, ForecastRun, DATE_COLUMN};
pub use types::horizon::{ForecastJob, InvalidJobLabel};
pub use types::model::{UnknownModel, WeatherModel, WindSource};
pub use types::raw_sample::{RawSample, RawVariable};
pub use types::site::{LatLon, Site};
pub use types::window::{ForecastWindow, IndexTimezone};

pub use utils::get_default_output_dir;
