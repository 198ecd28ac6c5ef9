//! Civic post review service: binary entrypoint.
//! Boots the Axum HTTP server, wiring settings, shared state, and middleware.
//!
//! See `README.md` for quickstart.

use anyhow::Context;
use tracing::info;

use civic_post_review::{
    api::{router, AppState},
    config::Settings,
    logging::init_tracing,
    metrics::Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings);

    let addr = settings.bind_addr();
    let metrics_enabled = settings.metrics_enabled;
    info!(
        app = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        remote = ?settings.remote_analyzer,
        max_post_length = settings.max_post_length,
        "starting"
    );

    let state = AppState::from_settings(settings)?;
    let mut app = router(state);
    if metrics_enabled {
        let metrics = Metrics::init()?;
        app = app.merge(metrics.router());
        info!("prometheus metrics exposed at /metrics");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
