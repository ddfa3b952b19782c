use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Extension, Router};
use news_radar::api::handlers::{handle_health, handle_search, AppState};
use news_radar::{config, index, logging, shutdown};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cfg = config::load_api().context("load config")?;

    let es = index::client::Client::new(
        &cfg.common.elasticsearch_addr,
        &cfg.common.elasticsearch_index,
    )
    .context("init elasticsearch")?;

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        es,
    });

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/news", get(handle_search))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
        .layer(Extension(state));

    let shutdown = shutdown::watch_signals()?;

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .context("bind http listener")?;

    tracing::info!("api server listening on {}", cfg.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait(shutdown))
        .await
        .context("serve http")?;

    tracing::info!("api server stopped");
    Ok(())
}
