use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use shoptalk::core::settings::Settings;
use shoptalk::logging;
use shoptalk::server::router::router;
use shoptalk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    logging::init(&settings.logging);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    let state = AppState::initialize(settings)
        .await
        .context("failed to initialize application state")?;

    if !state.llm.health_check().await.unwrap_or(false) {
        tracing::warn!("LLM endpoint is not reachable yet; chat turns will fail until it is");
    }

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("listening on {}", addr);

    let app: Router = router(state);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
