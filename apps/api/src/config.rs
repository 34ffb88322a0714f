use anyhow::{Context, Result};

use crate::anilist::DEFAULT_ANILIST_URL;
use crate::cms::DEFAULT_CMS_URL;

/// Application configuration loaded from environment variables.
/// Both upstreams are public, so everything has a sensible default.
#[derive(Debug, Clone)]
pub struct Config {
    pub anilist_url: String,
    pub cms_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Freshness window for upstream query results, in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum distinct range keys held per cache.
    pub cache_capacity: usize,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anilist_url: env_or("ANILIST_URL", DEFAULT_ANILIST_URL),
            cms_url: env_or("CMS_URL", DEFAULT_CMS_URL),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", "300")
                .parse::<u64>()
                .context("CACHE_TTL_SECS must be a number of seconds")?,
            cache_capacity: env_or("CACHE_CAPACITY", "64")
                .parse::<usize>()
                .context("CACHE_CAPACITY must be a positive integer")?,
            fetch_max_attempts: env_or("FETCH_MAX_ATTEMPTS", "3")
                .parse::<u32>()
                .context("FETCH_MAX_ATTEMPTS must be a positive integer")?,
            fetch_backoff_ms: env_or("FETCH_BACKOFF_MS", "1000")
                .parse::<u64>()
                .context("FETCH_BACKOFF_MS must be a number of milliseconds")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
