//! Dataset records and response shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single weather observation, as stored in the `measurement` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Identifier of the observing station
    pub station: String,
    /// Observation date as an ISO-8601 `YYYY-MM-DD` string
    pub date: String,
    /// Precipitation amount, if recorded
    pub prcp: Option<f64>,
    /// Temperature observation
    pub tobs: f64,
}

impl Measurement {
    /// Return a new Measurement object.
    pub fn new(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Self {
        Measurement {
            station: station.to_string(),
            date: date.to_string(),
            prcp,
            tobs,
        }
    }
}

/// A physical weather station, as stored in the `station` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    /// Unique station identifier
    pub station: String,
    /// Human-readable name
    pub name: String,
}

impl Station {
    /// Return a new Station object.
    pub fn new(station: &str, name: &str) -> Self {
        Station {
            station: station.to_string(),
            name: name.to_string(),
        }
    }
}

/// Precipitation by date.
///
/// Keyed by date alone, so rows from different stations on the same date collapse into one entry.
/// The last row inserted for a date wins. Keys serialise in ascending date order.
pub type PrecipitationHistory = BTreeMap<String, Option<f64>>;

/// An entry in the station list response
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StationEntry {
    pub station: String,
    pub name: String,
}

impl From<Station> for StationEntry {
    fn from(station: Station) -> Self {
        StationEntry {
            station: station.station,
            name: station.name,
        }
    }
}

/// A dated temperature observation
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TemperatureObservation {
    pub date: String,
    pub temperature: f64,
}

/// Minimum, average and maximum temperature over a date range.
///
/// All fields are `None` when no rows matched the range.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

impl TemperatureStats {
    /// Whether the aggregate ran over no rows.
    pub fn is_empty(&self) -> bool {
        self.tmin.is_none() && self.tavg.is_none() && self.tmax.is_none()
    }
}

/// Inclusive date range for the temperature statistics query.
///
/// Bounds are compared as strings against the stored dates and are not validated.
#[derive(Clone, Debug, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

impl DateRange {
    /// A range with no upper bound.
    pub fn starting(start: &str) -> Self {
        DateRange {
            start: start.to_string(),
            end: None,
        }
    }

    /// A range bounded on both sides.
    pub fn between(start: &str, end: &str) -> Self {
        DateRange {
            start: start.to_string(),
            end: Some(end.to_string()),
        }
    }
}
