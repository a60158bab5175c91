pub mod routes;

use crate::config::Config;
use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "frontend/dist"]
struct FrontendAssets;

pub async fn run_server(config: Arc<Config>) -> Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.api_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(address = %addr, "dashboard and API listening");

    let app = routes::router(routes::ApiState { config });
    axum::serve(listener, app)
        .await
        .context("HTTP server exited")
}

// The frontend is a single-page app: any path without a matching embedded
// file serves the app shell, and the mime comes from the file actually
// served, not the requested name.
pub fn frontend_asset(path: &str) -> Option<(Vec<u8>, String)> {
    let trimmed = path.trim_start_matches('/');
    let (name, file) = match FrontendAssets::get(trimmed) {
        Some(file) => (trimmed, file),
        None => ("index.html", FrontendAssets::get("index.html")?),
    };

    let mime = mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string();

    Some((file.data.into_owned(), mime))
}
