use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upload_spool::Uploader;
use upload_spool::config::{Registry, UploaderSettings};
use upload_spool::server::{AppState, build_router};

/// Deliver recorded files to their configured HTTP endpoints.
#[derive(Debug, Parser)]
#[command(name = "upload-spool", version)]
struct Args {
    /// Path to the TOML file describing devices, mixers and outputs.
    #[arg(long, env = "UPLOAD_SPOOL_CONFIG")]
    config: PathBuf,

    /// Address to serve `/health` and `/status` on.
    #[arg(long, env = "UPLOAD_SPOOL_STATUS_ADDR")]
    status_addr: Option<SocketAddr>,

    /// Skip the startup scan for undelivered recordings.
    #[arg(long)]
    no_scan: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_spool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let registry = match Registry::load(&args.config) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let uploader = match Uploader::init(&UploaderSettings::from_env()) {
        Ok(uploader) => uploader,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    if args.no_scan {
        info!("Startup scan disabled");
    } else {
        let found = uploader.scan_pending(&registry);
        info!(found, "Startup scan complete");
    }

    if let Some(addr) = args.status_addr {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(%addr, error = %e, "Failed to bind status server");
                uploader.shutdown().await;
                return ExitCode::FAILURE;
            }
        };
        let app = build_router(AppState::new(uploader.store().clone()));
        info!(%addr, "Status server listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Status server stopped");
            }
        });
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
    uploader.shutdown().await;
    ExitCode::SUCCESS
}
