//! HTTP API

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::dataset::Dataset;
use crate::error::SurfsUpError;
use crate::metrics;
use crate::models::{
    DateRange, PrecipitationHistory, StationEntry, TemperatureObservation, TemperatureStats,
};

use std::sync::Arc;

use axum::{
    body::{Body, BoxBody},
    extract::{Path, State},
    response::Html,
    routing::get,
    Json, Router,
};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Landing page listing the available routes.
const INDEX: &str = "Available Routes:<br/>\
    /api/v1.0/precipitation<br/>\
    /api/v1.0/stations<br/>\
    /api/v1.0/tobs<br/>\
    /api/v1.0/&lt;start&gt;<br/>\
    /api/v1.0/&lt;start&gt;/&lt;end&gt;<br/>";

/// `Service` type is used to serve requests.
///
/// We use axum's `Router` wrapped in a `NormalizePath` so that trailing slashes are trimmed
/// before routing.
pub type Service = NormalizePath<Router>;

/// Initialise the service, opening the dataset.
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn service(args: &CommandLineArgs) -> Result<Service, SurfsUpError> {
    let state = Arc::new(AppState::new(args)?);
    Ok(service_with_state(state))
}

/// Build the service around already constructed shared state.
pub fn service_with_state(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Returns a [axum::Router] for the API.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route("/precipitation", get(precipitation))
            .route("/stations", get(stations))
            .route("/tobs", get(tobs))
            .route("/:start", get(stats_from))
            .route("/:start/:end", get(stats_between))
    }

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1.0", v1())
        .layer(
            TraceLayer::new_for_http()
                .on_request(metrics::request_counter::<Body>)
                .on_response(metrics::record_response_metrics::<BoxBody>),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

/// Last 12 months of precipitation, keyed by date.
async fn precipitation(
    State(state): State<SharedAppState>,
) -> Result<Json<PrecipitationHistory>, SurfsUpError> {
    Ok(Json(state.query(Dataset::precipitation).await?))
}

/// All stations.
async fn stations(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<StationEntry>>, SurfsUpError> {
    Ok(Json(state.query(Dataset::stations).await?))
}

/// Last 12 months of temperature observations for the most active station.
async fn tobs(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<TemperatureObservation>>, SurfsUpError> {
    Ok(Json(state.query(Dataset::most_active_temperatures).await?))
}

// The statistics are wrapped in a single element array for compatibility with existing clients.

async fn stats_from(
    State(state): State<SharedAppState>,
    Path(start): Path<String>,
) -> Result<Json<Vec<TemperatureStats>>, SurfsUpError> {
    let range = DateRange::starting(&start);
    let stats = state
        .query(move |dataset| dataset.temperature_stats(&range))
        .await?;
    Ok(Json(vec![stats]))
}

async fn stats_between(
    State(state): State<SharedAppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Vec<TemperatureStats>>, SurfsUpError> {
    let range = DateRange::between(&start, &end);
    let stats = state
        .query(move |dataset| dataset.temperature_stats(&range))
        .await?;
    Ok(Json(vec![stats]))
}
