use anyhow::{Context, Result};
use axum::{routing::get, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod db;
mod models;
mod services;

use config::AppConfig;

/// Tracks all background task handles for graceful shutdown
struct BackgroundTasks {
    handles: Vec<(&'static str, JoinHandle<()>)>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    fn new() -> Self {
        Self {
            handles: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.handles.push((name, handle));
    }

    async fn shutdown(self) {
        tracing::info!("Initiating graceful shutdown...");

        // Signal all tasks to stop
        self.shutdown.cancel();

        // Wait for all tasks with a timeout
        for (name, handle) in self.handles {
            tracing::debug!("Waiting for {} to finish...", name);
            match tokio::time::timeout(Duration::from_secs(10), handle).await {
                Ok(Ok(())) => tracing::debug!("{} finished cleanly", name),
                Ok(Err(e)) => tracing::warn!("{} panicked: {}", name, e),
                Err(_) => tracing::warn!("{} timed out during shutdown", name),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: AppConfig,
    pub tmdb: Option<services::tmdb::TmdbClient>,
    pub itunes: services::itunes::ItunesClient,
    pub lyrics: services::lyrics::LyricsClient,
    pub translate: services::translate::TranslateClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torii=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load();

    config.paths.ensure_dirs().await?;

    config.log_config();

    // Database setup with optimized connection pool
    let database_url = config.database_url();
    tracing::debug!("Database URL: {}", database_url);

    let connect_options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        // Enable WAL mode for better concurrent performance
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        // NORMAL sync is safe with WAL and much faster
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        // Enable foreign key enforcement (track rows cascade with items)
        .foreign_keys(true)
        // Busy timeout for concurrent access (5 seconds)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        // Configure PRAGMAs on EVERY new connection via after_connect hook
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                use sqlx::Executor;
                // Cache size: -32000 = 32MB (negative = KB)
                conn.execute("PRAGMA cache_size = -32000").await?;
                // Store temp tables in memory
                conn.execute("PRAGMA temp_store = MEMORY").await?;
                Ok(())
            })
        })
        .connect_with(connect_options)
        .await?;

    tracing::info!("SQLite configured: WAL mode, 32MB cache (per connection)");

    db::migrate(&pool).await?;

    let addr = SocketAddr::new(
        config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?,
        config.port,
    );

    let state = std::sync::Arc::new(AppState {
        db: pool.clone(),
        tmdb: config
            .tmdb_read_token
            .clone()
            .map(services::tmdb::TmdbClient::new),
        itunes: services::itunes::ItunesClient::new(),
        lyrics: services::lyrics::LyricsClient::new(),
        translate: services::translate::TranslateClient::new(),
        config,
    });

    // Initialize background task manager with graceful shutdown support
    let mut bg_tasks = BackgroundTasks::new();
    let shutdown_token = bg_tasks.token();

    // Spawn session cleanup task with cancellation
    {
        let session_pool = pool.clone();
        let cancel = shutdown_token.clone();
        bg_tasks.spawn("session-cleanup", async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            tracing::info!("Session cleanup task started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Session cleanup received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(3600)) => {
                        match services::auth::cleanup_expired_sessions(&session_pool).await {
                            Ok(removed) if removed > 0 => {
                                tracing::info!("Cleaned up {} expired sessions", removed);
                            }
                            Ok(_) => {}
                            Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                        }
                    }
                }
            }
        });
    }

    // Root handler
    async fn root_handler() -> &'static str {
        "Torii Server"
    }

    // Build router
    let app = Router::new()
        .route("/", get(root_handler).head(root_handler))
        .route("/health", get(|| async { "OK" }))
        .merge(api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Starting server on {}", addr);

    // Create shutdown signal listener
    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
            _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
        }
    };

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // After server stops, gracefully shutdown background tasks
    bg_tasks.shutdown().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}
