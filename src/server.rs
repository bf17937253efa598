//! Web server

use crate::app::Service;
use crate::cli;

use std::{io, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use axum::ServiceExt;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use expanduser::expanduser;
use tokio::signal;
use tracing::info;

/// Serve the SurfsUp API
///
/// # Arguments
///
/// * `args`: Command line arguments
/// * `service`: The [crate::app::Service] to serve
pub async fn serve(args: &cli::CommandLineArgs, service: Service) -> io::Result<()> {
    let addr = SocketAddr::from_str(&format!("{}:{}", args.host, args.port)).map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid host name, IP address or port number: {err}"),
        )
    })?;

    // Catch ctrl+c and try to shutdown gracefully
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(
        handle.clone(),
        args.graceful_shutdown_timeout,
    ));

    if args.https {
        let abs_cert_file = resolve_tls_file(&args.cert_file, "certificate")?;
        let abs_key_file = resolve_tls_file(&args.key_file, "key")?;
        // Set up TLS config
        let tls_config = RustlsConfig::from_pem_file(abs_cert_file, abs_key_file).await?;
        info!(%addr, "Serving HTTPS");
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(service.into_make_service())
            .await
    } else {
        info!(%addr, "Serving HTTP");
        axum_server::bind(addr)
            .handle(handle)
            .serve(service.into_make_service())
            .await
    }
}

/// Expand `~` and canonicalise a TLS file path, checking that the file exists.
fn resolve_tls_file(path: &str, kind: &str) -> io::Result<PathBuf> {
    let expanded = expanduser(path)?;
    expanded.canonicalize().map_err(|err| {
        io::Error::new(
            err.kind(),
            format!(
                "TLS {kind} file expected at '{}' but not found: {err}",
                expanded.display()
            ),
        )
    })
}

/// Graceful shutdown handler
///
/// Installs signal handlers to catch Ctrl-C or SIGTERM and trigger a graceful shutdown.
async fn shutdown_signal(handle: Handle, timeout: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
    // Force shutdown if graceful shutdown takes longer than the timeout
    handle.graceful_shutdown(Some(Duration::from_secs(timeout)));
}
