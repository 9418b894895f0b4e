//! wld-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, connects storage and
//! the upstream feeds, wires middleware, and starts the HTTP server.  All
//! route handlers live in `routes.rs`; all shared state in `state.rs`.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use wld_daemon::{routes, state};
use wld_db::PgCountryStore;
use wld_sources::{OpenRatesFeed, RestCountriesFeed};

pub const ENV_DAEMON_ADDR: &str = "WLD_DAEMON_ADDR";
pub const ENV_CACHE_DIR: &str = "WLD_CACHE_DIR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let pool = wld_db::connect_from_env().await?;
    wld_db::migrate(&pool).await?;
    let store = Arc::new(PgCountryStore::new(pool));

    let countries = Arc::new(RestCountriesFeed::from_env()?);
    let rates = Arc::new(OpenRatesFeed::from_env()?);
    let cache_dir = cache_dir_from_env();

    let shared = Arc::new(state::AppState::new(store, countries, rates, cache_dir));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));
    info!("wld-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var(ENV_DAEMON_ADDR).ok()?.parse().ok()
}

fn cache_dir_from_env() -> PathBuf {
    std::env::var(ENV_CACHE_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cache"))
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(tower_http::cors::Any)
}
