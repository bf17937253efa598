//! This crate provides a small read-only HTTP API over a historical weather observation dataset
//! of precipitation and temperature readings tied to measurement stations.
//!
//! It answers four queries:
//!
//! * precipitation over the last 12 months of data, keyed by date
//! * the list of stations
//! * temperature observations of the most active station over the last 12 months of data
//! * minimum, average and maximum temperature over a date range
//!
//! "Last 12 months" is always anchored on the latest date recorded in the dataset rather than
//! the current date, so responses depend only on the data.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs serialisation of JSON response data.
//! * [rusqlite] with an [r2d2] connection pool reads the SQLite dataset.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
