//! Prometheus metrics

use crate::error::SurfsUpError;

use axum::http::{Request, Response};
use lazy_static::lazy_static;
use prometheus::{self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use tracing::Span;

lazy_static! {
    // Registry for holding metric state
    pub static ref REGISTRY: Registry = Registry::new();
    // Simple request counter
    pub static ref INCOMING_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("incoming_requests", "The number of HTTP requests received"),
        &["http_method"]
    ).unwrap();
    // Request counter by status code
    pub static ref RESPONSE_CODE_COLLECTOR: IntCounterVec = IntCounterVec::new(
        Opts::new("outgoing_response", "The number of responses sent."),
        &["status_code"]
    ).unwrap();
    // Request histogram by response time
    pub static ref RESPONSE_TIME_COLLECTOR: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new("response_time", "The time taken to respond to each request"),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &[],
    ).unwrap();
    // Dataset query histogram by query name
    pub static ref DATASET_QUERY_TIME: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new("dataset_query_time", "The time taken to run each dataset query"),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &["query"],
    ).unwrap();
}

/// Register all collectors with [REGISTRY].
///
/// Must be called once at startup, before `/metrics` is scraped.
pub fn register_metrics() -> Result<(), SurfsUpError> {
    REGISTRY.register(Box::new(INCOMING_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(RESPONSE_CODE_COLLECTOR.clone()))?;
    REGISTRY.register(Box::new(RESPONSE_TIME_COLLECTOR.clone()))?;
    REGISTRY.register(Box::new(DATASET_QUERY_TIME.clone()))?;
    Ok(())
}

/// Render the registry in the Prometheus text exposition format.
pub async fn metrics_handler() -> Result<String, SurfsUpError> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Increments the prometheus counter on all incoming requests, labelled by http method
pub fn request_counter<B>(request: &Request<B>, _span: &Span) {
    INCOMING_REQUESTS
        .with_label_values(&[&request.method().to_string().to_ascii_uppercase()])
        .inc();
}

/// Increment the prometheus counter on all outgoing responses, labelled by status code
pub fn record_response_metrics<B>(
    response: &Response<B>,
    latency: std::time::Duration,
    _span: &Span,
) {
    RESPONSE_CODE_COLLECTOR
        .with_label_values(&[response.status().as_str()])
        .inc();

    RESPONSE_TIME_COLLECTOR
        .with_label_values(&[])
        .observe(latency.as_secs_f64());
}

/// Start a timer for the named dataset query. The observation is recorded when the returned
/// timer is dropped.
pub fn query_timer(query: &str) -> prometheus::HistogramTimer {
    DATASET_QUERY_TIME.with_label_values(&[query]).start_timer()
}
