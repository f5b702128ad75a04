use habit_tracker::{load_tracker, router, workers, AppConfig, AppState, BlobStore};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let store = BlobStore::new(&config.data_dir);
    let mut tracker = load_tracker(&store).await;
    let streak = tracker.refresh_streak();
    info!(
        habits = tracker.habits().habits().len(),
        streak,
        "loaded state from {}",
        config.data_dir.display()
    );

    let state = AppState::new(store, tracker, config.slider_window, config.timer_tick);
    workers::spawn_slider_flusher(state.clone(), config.slider_window);

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
