//! Error handling.

use axum::{
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

/// SurfsUp error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum SurfsUpError {
    /// The dataset file does not exist
    #[error("dataset file {path} not found")]
    DatasetNotFound { path: String },

    /// An aggregate needing at least one measurement ran over an empty table
    #[error("no measurement data available to determine {what}")]
    DataUnavailable { what: &'static str },

    /// The cutoff date would fall outside the representable calendar range
    #[error("date {date} is out of range")]
    DateOutOfRange { date: String },

    /// A date stored in the dataset is not an ISO-8601 calendar date
    #[error("stored date {value:?} is not a valid YYYY-MM-DD date")]
    InvalidStoredDate {
        value: String,
        #[source]
        source: time::error::Parse,
    },

    /// Error formatting a date
    #[error("failed to format date")]
    FormatDate(#[from] time::error::Format),

    /// Error encoding or registering Prometheus metrics
    #[error("metrics error")]
    Metrics(#[from] prometheus::Error),

    /// Error acquiring a pooled dataset connection
    #[error("failed to acquire a dataset connection")]
    Pool(#[from] r2d2::Error),

    /// The dataset does not have the expected table or columns
    #[error("dataset table {table} does not match the expected schema")]
    SchemaMismatch {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Error executing a dataset query
    #[error("error querying the dataset")]
    Sqlite(#[from] rusqlite::Error),

    /// A blocking query task panicked or was cancelled
    #[error("dataset query task failed")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl IntoResponse for SurfsUpError {
    /// Convert from a `SurfsUpError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<SurfsUpError> for ErrorResponse {
    /// Convert from a `SurfsUpError` into an `ErrorResponse`.
    ///
    /// Every failure is a server-side problem: request parameters are never validated, so there
    /// is no client error case.
    fn from(error: SurfsUpError) -> Self {
        let response = match &error {
            SurfsUpError::DataUnavailable { what: _ }
            | SurfsUpError::DatasetNotFound { path: _ }
            | SurfsUpError::DateOutOfRange { date: _ }
            | SurfsUpError::InvalidStoredDate {
                value: _,
                source: _,
            }
            | SurfsUpError::FormatDate(_)
            | SurfsUpError::Metrics(_)
            | SurfsUpError::Pool(_)
            | SurfsUpError::SchemaMismatch {
                table: _,
                source: _,
            }
            | SurfsUpError::Sqlite(_)
            | SurfsUpError::TaskJoin(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hyper::HeaderMap;
    use time::macros::format_description;

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn test_surfsup_error(
        error: SurfsUpError,
        status: StatusCode,
        message: &str,
        caused_by: Option<Vec<&'static str>>,
    ) {
        let response = error.into_response();
        assert_eq!(status, response.status());
        let mut headers = HeaderMap::new();
        headers.insert(&header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert_eq!(headers, *response.headers());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message.to_string(), error_response.error.message);
        // Map Vec items from str to String
        let caused_by = caused_by.map(|cb| cb.iter().map(|s| s.to_string()).collect());
        assert_eq!(caused_by, error_response.error.caused_by);
    }

    #[tokio::test]
    async fn data_unavailable() {
        let error = SurfsUpError::DataUnavailable {
            what: "the latest measurement date",
        };
        let message = "no measurement data available to determine the latest measurement date";
        test_surfsup_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn dataset_not_found() {
        let error = SurfsUpError::DatasetNotFound {
            path: "hawaii.sqlite".to_string(),
        };
        let message = "dataset file hawaii.sqlite not found";
        test_surfsup_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn date_out_of_range() {
        let error = SurfsUpError::DateOutOfRange {
            date: "-9999-01-01".to_string(),
        };
        let message = "date -9999-01-01 is out of range";
        test_surfsup_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn invalid_stored_date() {
        let value = "2017-13-01".to_string();
        let source =
            time::Date::parse(&value, format_description!("[year]-[month]-[day]")).unwrap_err();
        let cause = source.to_string();
        let error = SurfsUpError::InvalidStoredDate { value, source };
        let message = "stored date \"2017-13-01\" is not a valid YYYY-MM-DD date";
        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message, error_response.error.message);
        assert_eq!(cause, error_response.error.caused_by.unwrap()[0]);
    }

    #[tokio::test]
    async fn schema_mismatch() {
        let error = SurfsUpError::SchemaMismatch {
            table: "station",
            source: rusqlite::Error::InvalidQuery,
        };
        let message = "dataset table station does not match the expected schema";
        let caused_by = Some(vec!["Query is not read-only"]);
        test_surfsup_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, caused_by).await;
    }

    #[tokio::test]
    async fn sqlite_error() {
        let error = SurfsUpError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        let message = "error querying the dataset";
        let caused_by = Some(vec!["Query returned no rows"]);
        test_surfsup_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, caused_by).await;
    }

    #[tokio::test]
    async fn task_join_error() {
        let handle = tokio::spawn(async {
            std::future::pending::<()>().await;
        });
        handle.abort();
        let join_error = handle.await.unwrap_err();
        assert!(join_error.is_cancelled());
        let error = SurfsUpError::TaskJoin(join_error);
        let message = "dataset query task failed";
        // JoinError has no source of its own; its message is the only cause.
        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message, error_response.error.message);
        let caused_by = error_response.error.caused_by.unwrap();
        assert_eq!(1, caused_by.len());
        assert!(caused_by[0].contains("cancelled"), "{caused_by:?}");
    }
}
