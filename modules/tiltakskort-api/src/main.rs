use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tiltakskort_common::Config;
use tiltakskort_graph::{CardRepository, GraphClient, QueryCache};

mod app;
mod rate_limit;
mod rest;

use app::{build_router, AppState};
use rate_limit::RateLimit;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tiltakskort=info".parse()?))
        .init();

    let config = Config::from_env().context("Missing Neo4j configuration")?;

    let client = GraphClient::connect_to(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
        &config.neo4j_database,
    )
    .await
    .context("Failed to create Neo4j driver")?;

    // A failed probe is logged, not fatal: the driver reconnects per query.
    match client.verify_connectivity().await {
        Ok(()) => info!(
            database = %config.neo4j_database,
            secure = config.is_secure_uri(),
            "Connected to Neo4j"
        ),
        Err(e) => error!(error = %e, "Neo4j connection verification failed"),
    }

    let repo = CardRepository::new(Arc::new(client), Arc::new(QueryCache::new()));
    let state = Arc::new(AppState::new(
        repo,
        RateLimit {
            max: config.rate_limit_max,
            window: Duration::from_secs(config.rate_limit_window_secs),
        },
    ));

    let app = build_router(state, &config.static_dir);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Tiltakskort API starting on {addr}");
    info!(static_dir = %config.static_dir.display(), "Serving frontend");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing server");
}
