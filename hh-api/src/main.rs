//! hh-api - Hobby Helper REST API server
//!
//! Serves the hobby catalogue, suggestions, user profiles, hobby history and
//! the reminder queue for the mobile client.

use anyhow::{Context, Result};
use clap::Parser;
use hh_api::{api::BuildInfo, build_router, cli::Args, init_tracing, AppState};
use hh_common::auth::resolve_jwt_secret;
use hh_common::config::BootstrapConfig;
use hh_common::db::init_database;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config resolves before the subscriber exists because it carries the log level
    let config = BootstrapConfig::resolve(args.overrides()).context("Failed to load configuration")?;

    init_tracing(&config.log_level);

    let build = BuildInfo::CURRENT;
    info!(
        "Starting Hobby Helper API (hh-api) v{} [{}] built {} ({})",
        build.version, build.git_hash, build.build_timestamp, build.build_profile
    );

    let db_path = config.database_path();
    info!("Root folder: {}", config.root_folder.display());
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let jwt_secret = resolve_jwt_secret(&pool, config.jwt_secret.as_deref())
        .await
        .context("Failed to resolve JWT secret")?;
    if config.jwt_secret.is_some() {
        info!("✓ Using configured JWT secret");
    } else {
        info!("✓ Using JWT secret from database");
    }

    info!("CORS origins: {}", config.allowed_origins.join(", "));
    let state = AppState::new(pool, jwt_secret).with_allowed_origins(config.allowed_origins.clone());
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("hh-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
