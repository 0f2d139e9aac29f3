use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kolachi_server::config::{API_TITLE, API_VERSION, AppConfig};
use kolachi_server::gtfs::TransitCatalog;
use kolachi_server::valhalla::ValhallaClient;
use kolachi_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kolachi_server=debug")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(version = API_VERSION, "starting {API_TITLE}");

    // Load every table up front so bad data fails the boot, not a request
    let catalog = TransitCatalog::open(&config.gtfs_dir);
    match catalog.warm().await {
        Ok(summary) => info!(
            dir = %catalog.dir().display(),
            routes = summary.routes,
            stops = summary.stops,
            trips = summary.trips,
            stop_times = summary.stop_times,
            "loaded GTFS dataset"
        ),
        Err(e) => {
            error!(error = %e, "failed to load GTFS dataset");
            return ExitCode::FAILURE;
        }
    }

    let valhalla = match ValhallaClient::new(config.valhalla.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create routing engine client");
            return ExitCode::FAILURE;
        }
    };
    info!(url = valhalla.base_url(), "routing engine configured");

    let state = AppState::new(catalog, valhalla);
    let app = create_router(state, &config.cors_origins);

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await
    {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Resolve once `signal` fires. If the signal cannot be installed, never
/// resolve, so the server runs until killed.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
