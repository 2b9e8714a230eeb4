//! Binary entry point for the authorization bridge.

use anyhow::Context;
use pagevault_api::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = pagevault_infra::config::load().context("loading configuration")?;
    let state = AppState::from_config(config).context("wiring collaborators")?;

    let addr =
        std::env::var("PAGEVAULT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener =
        tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "authorization bridge listening");

    axum::serve(listener, router(state)).await.context("serving requests")?;
    Ok(())
}
