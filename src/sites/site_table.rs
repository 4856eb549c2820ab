//! Loads the site configuration table.
//!
//! The table is a CSV file with at least the columns `Plant Name`, `Latitude`,
//! `Longitude` and `Timezone`. Other columns are ignored. The row right after the
//! header usually holds units and is skipped, lines starting with `#` are comments,
//! and Latin-1 encoded files are accepted.

use crate::sites::error::SiteTableError;
use crate::types::site::{LatLon, Site};
use chrono_tz::Tz;
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const NAME_COLUMN: &str = "Plant Name";
const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";
const TIMEZONE_COLUMN: &str = "Timezone";

#[derive(Debug, Deserialize)]
struct SiteRow {
    #[serde(rename = "Plant Name")]
    name: String,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
    #[serde(rename = "Timezone")]
    timezone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteTable {
    sites: Vec<Site>,
}

impl SiteTable {
    /// Reads and parses the site table at `path` on a blocking task.
    pub async fn load(path: &Path, skip_units_row: bool) -> Result<Self, SiteTableError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SiteTableError::SiteTableRead(path.to_path_buf(), e))?;

        let table = tokio::task::spawn_blocking(move || {
            Self::parse(&decode_text(bytes), skip_units_row)
        })
        .await??;

        info!("Loaded {} sites from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses site table text. Duplicate site names keep their first row; sites are
    /// returned sorted by name.
    pub fn parse(text: &str, skip_units_row: bool) -> Result<Self, SiteTableError> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        for required in [NAME_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN, TIMEZONE_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(SiteTableError::MissingColumn(required));
            }
        }

        let mut seen = HashSet::new();
        let mut sites = Vec::new();
        let skip = usize::from(skip_units_row);
        for record in reader.records().skip(skip) {
            let row: SiteRow = record?.deserialize(Some(&headers))?;
            if row.name.is_empty() {
                continue;
            }
            if !seen.insert(row.name.clone()) {
                warn!("Site '{}' is listed more than once, using its first row", row.name);
                continue;
            }
            sites.push(row.into_site()?);
        }

        if sites.is_empty() {
            return Err(SiteTableError::Empty);
        }
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { sites })
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|site| site.name == name)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl SiteRow {
    fn into_site(self) -> Result<Site, SiteTableError> {
        let latitude = parse_coordinate(&self.name, "latitude", &self.latitude, 90.0)?;
        let longitude = parse_coordinate(&self.name, "longitude", &self.longitude, 180.0)?;
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| SiteTableError::InvalidTimezone {
                site: self.name.clone(),
                timezone: self.timezone.clone(),
            })?;
        Ok(Site::new(self.name, LatLon(latitude, longitude), timezone))
    }
}

fn parse_coordinate(
    site: &str,
    field: &'static str,
    value: &str,
    limit: f64,
) -> Result<f64, SiteTableError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.abs() <= limit)
        .ok_or_else(|| SiteTableError::InvalidCoordinate {
            site: site.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Decodes UTF-8, falling back to Latin-1 where every byte maps to one code point.
fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect())
}
