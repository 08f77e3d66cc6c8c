use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod forward;

use app_state::AppState;
use config::load_settings;
use forward::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;
    let target_url = settings.target_url()?;
    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;

    let state = AppState {
        http: Client::new(),
        target_url: target_url.clone(),
    };
    let app = build_router(Arc::new(state));

    info!(%addr, %target_url, "rsvp proxy listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
