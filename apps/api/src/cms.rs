//! Directus CMS client for simuldub schedule records.
//!
//! The simuldub collection (licensed dub release windows) is editor-owned:
//! records are passed through to the dashboard untyped. Range queries are
//! retried with the shared policy and cached per date range.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::fetch::cache::TtlCache;
use crate::fetch::retry::{with_retry, RetryPolicy};

/// Production CMS instance.
pub const DEFAULT_CMS_URL: &str = "https://api.anitools.geekly.blog";
const SIMULDUB_COLLECTION: &str = "simuldub";

/// CMS records are schema-free from this service's point of view.
pub type SimuldubItem = serde_json::Value;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ItemsEnvelope {
    #[serde(default)]
    data: Vec<SimuldubItem>,
}

pub struct CmsClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    cache: TtlCache<String, Vec<SimuldubItem>>,
}

impl CmsClient {
    pub fn new(
        base_url: impl Into<String>,
        retry: RetryPolicy,
        cache: TtlCache<String, Vec<SimuldubItem>>,
    ) -> Result<Self, CmsError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            retry,
            cache,
        })
    }

    /// Simuldub records whose start date falls inside the given range
    /// (ISO 8601 date strings), cached per range.
    pub async fn simuldubs_between(
        &self,
        range_start: &str,
        range_end: &str,
    ) -> Result<Vec<SimuldubItem>, CmsError> {
        let key = format!("{range_start}-{range_end}");
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "simuldub cache hit");
            return Ok(hit);
        }

        let items = with_retry(&self.retry, || self.fetch_range(range_start, range_end)).await?;
        self.cache.insert(key, items.clone());
        Ok(items)
    }

    async fn fetch_range(
        &self,
        range_start: &str,
        range_end: &str,
    ) -> Result<Vec<SimuldubItem>, CmsError> {
        let url = format!("{}/items/{SIMULDUB_COLLECTION}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("filter", range_filter(range_start, range_end).to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CmsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ItemsEnvelope = response.json().await?;
        Ok(envelope.data)
    }
}

/// Directus filter: published or cancelled records starting inside the range.
fn range_filter(range_start: &str, range_end: &str) -> serde_json::Value {
    json!({
        "status": {
            "_or": [{"_eq": "published"}, {"_eq": "cancelled"}]
        },
        "start_date": {
            "_gte": range_start,
            "_lte": range_end
        }
    })
}
