//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// SurfsUp command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "SURFSUP_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 5000, env = "SURFSUP_PORT")]
    pub port: u16,
    /// Path to the SQLite file holding the measurement and station tables
    #[arg(long, default_value = "hawaii.sqlite", env = "SURFSUP_DATABASE")]
    pub database: String,
    /// Maximum number of pooled read-only connections to the dataset
    #[arg(
        long,
        default_value_t = 4,
        env = "SURFSUP_CONNECTION_LIMIT",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub connection_limit: u32,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "SURFSUP_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/surfsup/certs/cert.pem",
        env = "SURFSUP_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/surfsup/certs/key.pem",
        env = "SURFSUP_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "SURFSUP_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "SURFSUP_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
