mod anilist;
mod calendar;
mod cms;
mod config;
mod errors;
mod fetch;
mod layout;
mod routes;
mod state;
mod stats;

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::anilist::AniListClient;
use crate::calendar::ScheduleService;
use crate::cms::CmsClient;
use crate::config::Config;
use crate::fetch::{RetryPolicy, TtlCache};
use crate::layout::LayoutTuning;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting anitools API v{}", env!("CARGO_PKG_VERSION"));

    let retry = RetryPolicy::linear(
        config.fetch_max_attempts,
        Duration::from_millis(config.fetch_backoff_ms),
    );
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let capacity =
        NonZeroUsize::new(config.cache_capacity).context("CACHE_CAPACITY must be at least 1")?;

    let anilist = AniListClient::new(config.anilist_url.clone())?;
    info!("AniList client initialized ({})", config.anilist_url);

    let schedules = Arc::new(ScheduleService::new(
        anilist.clone(),
        retry.clone(),
        TtlCache::new(capacity, ttl),
    ));

    let cms = Arc::new(CmsClient::new(
        config.cms_url.clone(),
        retry,
        TtlCache::new(capacity, ttl),
    )?);
    info!("CMS client initialized ({})", config.cms_url);

    let state = AppState {
        anilist,
        schedules,
        cms,
        layout_tuning: LayoutTuning::default(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the dashboard is a browser client

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
