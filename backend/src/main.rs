//! Pet Care Backend
//!
//! Care signals for pet owners: diet pattern alerts, reminder planning and
//! an assistant with an emergency gate.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic over the in-memory care ledger
//! - Store: JSON collections mirrored to disk by a debounced writer
//! - Collaborators: notification outbox and remote adviser behind traits

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use pet_care_backend::{config, routes, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        data_dir = %config.storage.data_dir.display(),
        "Starting Pet Care Backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let metrics = PrometheusBuilder::new().install_recorder()?;

    // Create application state (loads the care ledger)
    let state = AppState::new(config.clone(), metrics).await?;

    // Bring delivery in line with what was loaded
    let report = state.replan().await;
    info!(scheduled = report.scheduled, skipped = report.skipped, "Initial reminder plan");

    // Build application
    let app = routes::create_router(state.clone());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flushing pending writes");
    state.writer.flush().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "pet_care_backend=info,tower_http=info".into()
        } else {
            "pet_care_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.ai.enabled && config.ai.api_key.is_none() {
        errors.push("ai.enabled requires ai.api_key (PC__AI__API_KEY)");
    }

    if config.storage.data_dir.is_relative() {
        warn!("Storage directory is relative - ensure the working directory is stable");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
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
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
