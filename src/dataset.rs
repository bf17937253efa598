//! Read-only access to the weather observation dataset.
//!
//! The dataset is a SQLite file holding two tables:
//!
//! * `measurement (station, date, prcp, tobs)`: one row per station per observation date.
//! * `station (station, name)`: one row per physical station.
//!
//! Dates are stored as `YYYY-MM-DD` text, so all date filters are plain string comparisons. This
//! is also how user-supplied range bounds are compared: they are not validated, and a bound that
//! is not a date simply compares lexicographically.

use crate::error::SurfsUpError;
use crate::metrics;
use crate::models::{
    DateRange, PrecipitationHistory, StationEntry, TemperatureObservation, TemperatureStats,
};

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OpenFlags, OptionalExtension};
use time::{macros::format_description, Date, Duration};
use tracing::{debug, info, instrument};

/// SQLite connection pool type alias
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Pooled connection type alias
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Length of the "last 12 months" window, counted back from the latest recorded date.
pub const HISTORY_WINDOW_DAYS: i64 = 365;

/// The statically declared columns of each table, checked once at startup.
const SCHEMA: [(&str, &str); 2] = [
    (
        "measurement",
        "SELECT station, date, prcp, tobs FROM measurement LIMIT 0",
    ),
    ("station", "SELECT station, name FROM station LIMIT 0"),
];

/// Parse a `YYYY-MM-DD` date.
fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
}

/// Format a date as `YYYY-MM-DD`, the representation used in the dataset.
fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

/// Map a `min, avg, max` aggregate row. Aggregates over no rows are NULL.
fn row_to_stats(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemperatureStats> {
    Ok(TemperatureStats {
        tmin: row.get(0)?,
        tavg: row.get(1)?,
        tmax: row.get(2)?,
    })
}

/// Reference point for "recent" queries.
///
/// The anchor is the most recent date present in the measurement table, never the current
/// date, so results depend only on the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateAnchor {
    /// Latest recorded measurement date
    pub latest: Date,
    /// `latest` minus [HISTORY_WINDOW_DAYS]
    pub cutoff: Date,
}

impl DateAnchor {
    /// Build an anchor from the latest stored date string.
    pub fn from_latest(latest: &str) -> Result<Self, SurfsUpError> {
        let latest_date = parse_date(latest).map_err(|source| SurfsUpError::InvalidStoredDate {
            value: latest.to_string(),
            source,
        })?;
        let cutoff = latest_date
            .checked_sub(Duration::days(HISTORY_WINDOW_DAYS))
            .ok_or_else(|| SurfsUpError::DateOutOfRange {
                date: latest.to_string(),
            })?;
        Ok(DateAnchor {
            latest: latest_date,
            cutoff,
        })
    }

    /// The cutoff in the stored `YYYY-MM-DD` representation.
    pub fn cutoff_string(&self) -> Result<String, SurfsUpError> {
        Ok(format_date(self.cutoff)?)
    }
}

/// Query service over the dataset.
///
/// Holds a pool of read-only connections. All methods block on SQLite and should be run off the
/// async executor.
#[derive(Debug)]
pub struct Dataset {
    pool: ConnectionPool,
}

impl Dataset {
    /// Open the dataset at `path` and verify its schema.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to an existing SQLite file
    /// * `max_connections`: Maximum number of pooled connections
    pub fn open(path: &str, max_connections: u32) -> Result<Self, SurfsUpError> {
        info!(path, max_connections, "Opening dataset");
        // A read-only open of a missing file would otherwise only fail once the pool times out.
        if !Path::new(path).is_file() {
            return Err(SurfsUpError::DatasetNotFound {
                path: path.to_string(),
            });
        }
        let manager = SqliteConnectionManager::file(path).with_flags(
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        );
        let pool = Pool::builder().max_size(max_connections).build(manager)?;
        let dataset = Dataset { pool };
        dataset.check_schema()?;
        debug!("Dataset opened successfully");
        Ok(dataset)
    }

    fn connection(&self) -> Result<PooledConn, SurfsUpError> {
        Ok(self.pool.get()?)
    }

    /// Check that both tables exist with the expected columns.
    pub fn check_schema(&self) -> Result<(), SurfsUpError> {
        let conn = self.connection()?;
        for (table, sql) in SCHEMA {
            conn.prepare(sql)
                .map_err(|source| SurfsUpError::SchemaMismatch { table, source })?;
        }
        Ok(())
    }

    /// Compute the latest-date anchor.
    ///
    /// Fails with [SurfsUpError::DataUnavailable] when the measurement table is empty.
    pub fn date_anchor(&self) -> Result<DateAnchor, SurfsUpError> {
        let _timer = metrics::query_timer("date_anchor");
        let conn = self.connection()?;
        let latest: Option<String> =
            conn.query_row("SELECT max(date) FROM measurement", [], |row| row.get(0))?;
        let latest = latest.ok_or(SurfsUpError::DataUnavailable {
            what: "the latest measurement date",
        })?;
        let anchor = DateAnchor::from_latest(&latest)?;
        debug!(latest = %anchor.latest, cutoff = %anchor.cutoff, "Computed date anchor");
        Ok(anchor)
    }

    /// Precipitation for the last 12 months of data, keyed by date.
    #[instrument(skip(self))]
    pub fn precipitation(&self) -> Result<PrecipitationHistory, SurfsUpError> {
        let cutoff = self.date_anchor()?.cutoff_string()?;
        let _timer = metrics::query_timer("precipitation");
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT date, prcp FROM measurement WHERE date >= ?1")?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;
        let mut history = PrecipitationHistory::new();
        let mut count = 0;
        for row in rows {
            let (date, prcp) = row?;
            history.insert(date, prcp);
            count += 1;
        }
        debug!(cutoff = %cutoff, rows = count, dates = history.len(), "Queried precipitation");
        Ok(history)
    }

    /// All stations, in store order.
    #[instrument(skip(self))]
    pub fn stations(&self) -> Result<Vec<StationEntry>, SurfsUpError> {
        let _timer = metrics::query_timer("stations");
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT station, name FROM station")?;
        let stations = stmt
            .query_map([], |row| {
                Ok(StationEntry {
                    station: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(stations = stations.len(), "Queried stations");
        Ok(stations)
    }

    /// The station with the most measurement rows.
    ///
    /// Ties are broken by the lexicographically smallest station identifier.
    pub fn most_active_station(&self) -> Result<String, SurfsUpError> {
        let _timer = metrics::query_timer("most_active_station");
        let conn = self.connection()?;
        conn.query_row(
            "SELECT station FROM measurement
             GROUP BY station
             ORDER BY count(*) DESC, station ASC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(SurfsUpError::DataUnavailable {
            what: "the most active station",
        })
    }

    /// Temperature observations of the most active station for the last 12 months of data.
    ///
    /// The window is anchored on the latest date across all stations.
    #[instrument(skip(self))]
    pub fn most_active_temperatures(&self) -> Result<Vec<TemperatureObservation>, SurfsUpError> {
        let station = self.most_active_station()?;
        let cutoff = self.date_anchor()?.cutoff_string()?;
        let _timer = metrics::query_timer("temperatures");
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT date, tobs FROM measurement WHERE station = ?1 AND date >= ?2")?;
        let observations = stmt
            .query_map(params![station, cutoff], |row| {
                Ok(TemperatureObservation {
                    date: row.get(0)?,
                    temperature: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            station = %station,
            cutoff = %cutoff,
            observations = observations.len(),
            "Queried temperature observations"
        );
        Ok(observations)
    }

    /// Minimum, average and maximum temperature over an inclusive date range.
    ///
    /// A range matching no rows yields empty statistics rather than an error.
    #[instrument(skip(self))]
    pub fn temperature_stats(&self, range: &DateRange) -> Result<TemperatureStats, SurfsUpError> {
        let _timer = metrics::query_timer("temperature_stats");
        let conn = self.connection()?;
        let stats = match &range.end {
            None => conn.query_row(
                "SELECT min(tobs), avg(tobs), max(tobs) FROM measurement WHERE date >= ?1",
                params![range.start],
                row_to_stats,
            )?,
            Some(end) => conn.query_row(
                "SELECT min(tobs), avg(tobs), max(tobs) FROM measurement
                 WHERE date >= ?1 AND date <= ?2",
                params![range.start, end],
                row_to_stats,
            )?,
        };
        debug!(empty = stats.is_empty(), "Queried temperature statistics");
        Ok(stats)
    }
}
