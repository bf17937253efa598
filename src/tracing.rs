//! Tracing (logging)

use crate::cli::CommandLineArgs;

use opentelemetry::global;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initlialise tracing (logging)
///
/// Applies a filter based on the `RUST_LOG` environment variable, falling back to enable debug
/// logging for this crate and tower_http if not set.
///
/// If Jaeger export is enabled, spans are also sent to a Jaeger agent using the default agent
/// endpoint (overridable via the `OTEL_EXPORTER_JAEGER_AGENT_*` environment variables).
pub fn init_tracing(args: &CommandLineArgs) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "surfsup=debug,tower_http=debug".into());
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());
    if args.enable_jaeger {
        global::set_text_map_propagator(opentelemetry_jaeger::Propagator::new());
        match opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name("surfsup")
            .install_batch(opentelemetry::runtime::Tokio)
        {
            Ok(tracer) => {
                let opentelemetry = tracing_opentelemetry::layer().with_tracer(tracer);
                subscriber.with(opentelemetry).init();
            }
            Err(err) => {
                subscriber.init();
                tracing::warn!("failed to install Jaeger pipeline, continuing without it: {err}");
            }
        }
    } else {
        subscriber.init();
    }
}

/// Flush and shut down any span exporters.
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}
