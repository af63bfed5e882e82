//! Catalog backend
//!
//! Item catalog with user accounts, categories, image uploads and reviews.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Repositories: Data access (PostgreSQL with SQLx)
//! - Cleanup worker: removes uploaded images after their item is deleted

use anyhow::Result;
use catalog_backend::{cleanup::CleanupQueue, config, db, routes, state::AppState};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Catalog backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    if !config::AppConfig::is_production() {
        db::run_migrations(&db_pool).await?;
    }

    tokio::fs::create_dir_all(&config.storage.image_root).await?;

    let (cleanup, cleanup_worker) = CleanupQueue::start();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db_pool, config, cleanup);
    let app = routes::create_router(state);

    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last queue handle, so the worker drains and exits.
    match tokio::time::timeout(Duration::from_secs(10), cleanup_worker).await {
        Ok(Ok(())) => info!("Cleanup worker finished"),
        Ok(Err(e)) => error!("Cleanup worker panicked: {}", e),
        Err(_) => warn!("Cleanup worker did not finish in time; pending jobs dropped"),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "catalog_backend=info,tower_http=info".into()
        } else {
            "catalog_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    let secret = config.jwt.secret.expose_secret();
    if secret.contains("development") || secret.len() < 32 {
        errors.push("JWT secret must be at least 32 characters and not contain 'development'");
    }

    if config.jwt.access_token_expiry_secs <= 0 {
        errors.push("Access token lifetime must be positive");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
