//! This file defines the surfsup binary entry point.

use std::process::ExitCode;

use surfsup::app;
use surfsup::cli;
use surfsup::metrics;
use surfsup::server;
use surfsup::tracing;

/// Application entry point
#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    tracing::init_tracing(&args);
    ::tracing::debug!(?args, "Parsed command line arguments");
    let result = run(&args).await;
    tracing::shutdown_tracing();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ::tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Register metrics, open the dataset and serve until shutdown.
///
/// The dataset is released when the service is dropped on return.
async fn run(args: &cli::CommandLineArgs) -> Result<(), Box<dyn std::error::Error>> {
    metrics::register_metrics()?;
    let service = app::service(args)?;
    server::serve(args, service).await?;
    Ok(())
}
