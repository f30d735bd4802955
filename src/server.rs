//! HTTP server initialization and runtime setup.
//!
//! Handles storage and cache bootstrap, migration, and the Axum server
//! lifecycle. Connection handles are built here exactly once and threaded
//! through [`AppState`]; per-request errors never reach this layer.

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::{CodeGenerator, DEFAULT_ALPHABET};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL when `DATABASE_URL` is set, in-memory otherwise)
/// - Schema migrations (PostgreSQL only)
/// - Redis cache (or NullCache fallback)
/// - Code generator and link service
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if storage bootstrap, server bind, or a server runtime
/// error occurs. These are the only failures that abort the process.
pub async fn run(config: Config) -> Result<()> {
    let store: Arc<dyn LinkRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = connect_postgres(&config, database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;

            Arc::new(PgLinkRepository::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; links are kept in memory and lost on restart");
            Arc::new(MemoryLinkRepository::new())
        }
    };

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let generator = Arc::new(
        CodeGenerator::new(
            config.generator_seed,
            config.generator_worker_id,
            DEFAULT_ALPHABET,
            config.code_length,
        )
        .context("Invalid code generator configuration")?,
    );

    let links = Arc::new(LinkService::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        generator,
        Duration::from_millis(config.store_timeout_ms),
        Duration::from_millis(config.cache_timeout_ms),
    ));

    let state = AppState::new(links, store, cache);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Connects to PostgreSQL with exponential backoff, absorbing the transient
/// refusals a freshly scheduled database container produces.
async fn connect_postgres(config: &Config, database_url: &str) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(200).map(jitter).take(5);

    let pool = Retry::spawn(strategy, || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(database_url)
    })
    .await
    .context("Failed to connect to PostgreSQL")?;

    Ok(pool)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
