use crate::dataset::Dataset;
use crate::models::{Measurement, Station};

use rusqlite::{params, Connection};
use tempfile::TempDir;

/// Measurement table layout of the Hawaii climate dataset.
pub(crate) const MEASUREMENT_DDL: &str = "CREATE TABLE measurement (
    id INTEGER NOT NULL PRIMARY KEY,
    station TEXT,
    date TEXT,
    prcp FLOAT,
    tobs FLOAT
);";

/// Station table layout of the Hawaii climate dataset.
pub(crate) const STATION_DDL: &str = "CREATE TABLE station (
    id INTEGER NOT NULL PRIMARY KEY,
    station TEXT,
    name TEXT,
    latitude FLOAT,
    longitude FLOAT,
    elevation FLOAT
);";

/// Create a list of stations.
pub(crate) fn get_test_stations() -> Vec<Station> {
    vec![
        Station::new("USC00519397", "WAIKIKI 717.2, HI US"),
        Station::new("USC00513117", "KANEOHE 838.1, HI US"),
        Station::new("USC00519281", "WAIHEE 837.5, HI US"),
    ]
}

/// Create a list of measurements.
///
/// The latest date is 2017-08-23, giving a cutoff of 2016-08-23. USC00519281 is the most active
/// station. Both USC00519281 and USC00519397 report on 2017-08-23, USC00519397 last.
pub(crate) fn get_test_measurements() -> Vec<Measurement> {
    vec![
        Measurement::new("USC00519281", "2010-01-01", Some(0.08), 65.0),
        Measurement::new("USC00519397", "2015-06-01", Some(0.1), 70.0),
        Measurement::new("USC00519281", "2016-08-22", Some(1.0), 75.0),
        Measurement::new("USC00519281", "2016-08-23", Some(0.05), 77.0),
        Measurement::new("USC00519281", "2017-01-01", None, 65.0),
        Measurement::new("USC00513117", "2017-07-04", Some(0.2), 80.0),
        Measurement::new("USC00519281", "2017-08-23", Some(0.0), 79.0),
        Measurement::new("USC00519397", "2017-08-23", Some(0.45), 81.0),
    ]
}

/// Write a dataset file at `path` holding the given rows, in order.
pub(crate) fn write_dataset(
    path: &std::path::Path,
    measurements: &[Measurement],
    stations: &[Station],
) {
    let mut conn = Connection::open(path).unwrap();
    conn.execute_batch(MEASUREMENT_DDL).unwrap();
    conn.execute_batch(STATION_DDL).unwrap();
    let tx = conn.transaction().unwrap();
    for m in measurements {
        tx.execute(
            "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
            params![m.station, m.date, m.prcp, m.tobs],
        )
        .unwrap();
    }
    for s in stations {
        tx.execute(
            "INSERT INTO station (station, name) VALUES (?1, ?2)",
            params![s.station, s.name],
        )
        .unwrap();
    }
    tx.commit().unwrap();
}

/// A [Dataset] opened over a temporary file, removed on drop.
pub(crate) struct TestDataset {
    pub dataset: Dataset,
    pub path: String,
    _dir: TempDir,
}

impl TestDataset {
    /// Create a dataset holding the given rows.
    pub(crate) fn new(measurements: &[Measurement], stations: &[Station]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hawaii.sqlite");
        write_dataset(&path, measurements, stations);
        let path = path.to_str().unwrap().to_string();
        let dataset = Dataset::open(&path, 2).unwrap();
        TestDataset {
            dataset,
            path,
            _dir: dir,
        }
    }

    /// Create a dataset holding [get_test_measurements] and [get_test_stations].
    pub(crate) fn default_data() -> Self {
        Self::new(&get_test_measurements(), &get_test_stations())
    }
}
