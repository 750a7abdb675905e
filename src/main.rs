use std::sync::Arc;
use std::time::Duration;

use filmdeck::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, MemoryWatchHistory, PgWatchHistory, WatchHistory},
    services::{FilmographyProvider, SeenReporter, SwipeConfig, TmdbProvider},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filmdeck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let history: Arc<dyn WatchHistory> = match &config.database_url {
        Some(url) => Arc::new(PgWatchHistory::new(create_pool(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set, keeping watch history in memory");
            Arc::new(MemoryWatchHistory::new())
        }
    };

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client);

    let provider: Arc<dyn FilmographyProvider> = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let (reporter, reporter_handle) = SeenReporter::new(history.clone());

    let state = AppState::new(
        provider,
        history,
        reporter,
        SwipeConfig::with_screen_width(config.screen_width),
    );
    let sessions = state.sessions.clone();
    let sweeper = sessions.spawn_sweeper(config.session_idle());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    // Unmounting every live session applies swipes still animating out.
    sessions.sweep_idle(Duration::ZERO).await;
    // Pending "seen" reports must land before exit.
    reporter_handle.shutdown().await;
    cache_handle.shutdown().await;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
