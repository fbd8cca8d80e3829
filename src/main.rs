use axum::{Router, routing::get};
use fincahub::{AppState, Config, ListingStore, routes, seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init();

    info!(
        bind_address = config.bind_address.as_str(),
        "Starting Fincahub listing service"
    );

    // All state lives in memory for the process lifetime; the seed
    // dataset is loaded before the listener binds.
    let mut store = ListingStore::new();
    seed(&mut store);
    let state = AppState::new(store);

    info!(target: "fincahub", "Seed dataset loaded");

    let app = Router::new()
        .nest("/api", routes())
        .route("/health", get(|| async { "OK" }))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .unwrap();

    axum::serve(listener, app)
        .with_graceful_shutdown(signal())
        .await
        .unwrap();
}

async fn signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!(target: "fincahub", "Shutdown signal received, terminating...");
}
