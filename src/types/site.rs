//! Defines the sites forecasts are collected for.

use chrono_tz::Tz;
use std::fmt;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1),
/// both in decimal degrees.
///
/// # Examples
///
/// ```
/// use forecast_history::LatLon;
///
/// let golden = LatLon(39.742, -105.18);
/// assert_eq!(golden.0, 39.742); // Latitude
/// assert_eq!(golden.1, -105.18); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.0, self.1)
    }
}

/// A named location forecasts are downloaded for.
///
/// Sites are immutable for the duration of a run and usually come from a
/// [`crate::SiteTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Display name, used verbatim in log column names (e.g. "Mill Creek: GHI").
    pub name: String,
    pub location: LatLon,
    /// IANA timezone of the site, used to place forecast days on the local calendar.
    pub timezone: Tz,
}

impl Site {
    pub fn new(name: impl Into<String>, location: LatLon, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            location,
            timezone,
        }
    }

    /// Lower-cased name used as the first part of the log file names.
    ///
    /// ```
    /// use forecast_history::{LatLon, Site};
    ///
    /// let site = Site::new("Mill Creek", LatLon(40.0, -75.0), chrono_tz::America::New_York);
    /// assert_eq!(site.file_stem(), "mill creek");
    /// ```
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.location, self.timezone)
    }
}
