//! Waypost Server - media and upload endpoints for the journal

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypost_cli::{run_server, ServerConfig};
use waypost_store::{DEFAULT_STORAGE_ROOT, STORAGE_ROOT_ENV};

#[derive(Parser, Debug)]
#[command(name = "waypost-server")]
#[command(about = "Media and upload server for Waypost file storage")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "WAYPOST_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "WAYPOST_PORT")]
    port: u16,

    /// Directory all buckets live under
    #[arg(long, env = STORAGE_ROOT_ENV)]
    storage_root: Option<PathBuf>,

    /// Requests per second allowed per client
    #[arg(long, default_value = "100", env = "WAYPOST_RATE_LIMIT_RPS")]
    rate_limit_rps: u32,

    /// Proxy addresses allowed to set X-Forwarded-For (comma separated)
    #[arg(long = "trusted-proxy", env = "WAYPOST_TRUSTED_PROXIES", value_delimiter = ',')]
    trusted_proxies: Vec<IpAddr>,

    /// Maximum upload request size in bytes
    #[arg(long, default_value = "52428800", env = "WAYPOST_MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,

    /// Seconds before an unpromoted staged upload is swept
    #[arg(long, default_value = "86400", env = "WAYPOST_STAGING_TTL_SECS")]
    staging_ttl_secs: u64,

    /// Disable CORS headers
    #[arg(long, env = "WAYPOST_NO_CORS")]
    no_cors: bool,

    /// Enable debug logging
    #[arg(short, long, env = "WAYPOST_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "waypost_cli={level},waypost_store={level},tower_http=debug",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let storage_root = match args.storage_root {
        Some(root) => root,
        None => {
            tracing::warn!(
                "{} not set, using development default {}",
                STORAGE_ROOT_ENV,
                DEFAULT_STORAGE_ROOT
            );
            PathBuf::from(DEFAULT_STORAGE_ROOT)
        }
    };

    tracing::info!("Starting Waypost on {}:{}", args.host, args.port);
    tracing::info!("Storage root: {}", storage_root.display());

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        storage_root,
        rate_limit_rps: args.rate_limit_rps,
        trusted_proxies: args.trusted_proxies,
        max_upload_size: args.max_upload_bytes,
        cors_enabled: !args.no_cors,
        staging_ttl_secs: args.staging_ttl_secs,
    };

    run_server(config).await
}
