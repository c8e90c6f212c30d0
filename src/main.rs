use attendance_tracker::{AppState, Config, JsonFileStore, Tracker, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let store = JsonFileStore::new(config.data_path.clone());
    let subjects = store.load().await;
    let tracker = Tracker::with_subjects(subjects, config.tracker);
    info!(
        subjects = tracker.subjects().len(),
        path = %store.path().display(),
        history_cap = ?config.tracker.history_cap,
        undo_policy = ?config.tracker.undo_policy,
        "tracker ready"
    );

    let app = router(AppState::new(store, tracker, config.default_target));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
