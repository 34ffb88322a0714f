//! Airing-schedule fetch service: pagination + retry + TTL cache +
//! single-flight, keyed by the query's timestamp window.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::anilist::model::AiringSchedule;
use crate::anilist::{AniListClient, AniListError};
use crate::fetch::cache::TtlCache;
use crate::fetch::paginate::{fetch_all_pages, Page, PageFetcher};
use crate::fetch::retry::RetryPolicy;

/// Cache key for an airing window.
pub fn range_key(airing_at_greater: i64, airing_at_lesser: i64) -> String {
    format!("{airing_at_greater}-{airing_at_lesser}")
}

/// Source of airing-schedule pages. Seam for tests; the AniList client is the
/// production implementation.
#[async_trait]
pub trait AiringSource: Send + Sync {
    async fn airing_page(
        &self,
        page: u32,
        airing_at_greater: i64,
        airing_at_lesser: i64,
    ) -> Result<Page<AiringSchedule>, AniListError>;
}

#[async_trait]
impl AiringSource for AniListClient {
    async fn airing_page(
        &self,
        page: u32,
        airing_at_greater: i64,
        airing_at_lesser: i64,
    ) -> Result<Page<AiringSchedule>, AniListError> {
        AniListClient::airing_page(self, page, airing_at_greater, airing_at_lesser).await
    }
}

/// Adapter fixing the window so the generic pagination loop only sees page
/// numbers.
struct AiringPages<'a, S: AiringSource> {
    source: &'a S,
    airing_at_greater: i64,
    airing_at_lesser: i64,
}

#[async_trait]
impl<S: AiringSource> PageFetcher for AiringPages<'_, S> {
    type Item = AiringSchedule;
    type Error = AniListError;

    async fn fetch_page(&self, page: u32) -> Result<Page<AiringSchedule>, AniListError> {
        self.source
            .airing_page(page, self.airing_at_greater, self.airing_at_lesser)
            .await
    }
}

pub struct ScheduleService<S: AiringSource> {
    source: S,
    retry: RetryPolicy,
    cache: TtlCache<String, Vec<AiringSchedule>>,
    /// Per-key guards collapsing concurrent fetches of the same window.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: AiringSource> ScheduleService<S> {
    pub fn new(
        source: S,
        retry: RetryPolicy,
        cache: TtlCache<String, Vec<AiringSchedule>>,
    ) -> Self {
        Self {
            source,
            retry,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// All airing schedules inside the window.
    ///
    /// Best-effort: a page that exhausts its retries truncates the result,
    /// and the (possibly partial) list is cached and returned, never an
    /// error.
    pub async fn schedules_between(
        &self,
        airing_at_greater: i64,
        airing_at_lesser: i64,
    ) -> Vec<AiringSchedule> {
        let key = range_key(airing_at_greater, airing_at_lesser);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, schedules = hit.len(), "airing cache hit");
            return hit;
        }

        let guard = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        let _held = guard.lock().await;

        // A concurrent caller may have populated the cache while we waited.
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "airing cache hit after in-flight wait");
            return hit;
        }

        let fetcher = AiringPages {
            source: &self.source,
            airing_at_greater,
            airing_at_lesser,
        };
        let schedules = fetch_all_pages(&fetcher, &self.retry).await;
        self.cache.insert(key.clone(), schedules.clone());

        drop(_held);
        self.in_flight.lock().await.remove(&key);
        schedules
    }

    /// Drops the cached window so the next call refetches.
    pub fn invalidate(&self, airing_at_greater: i64, airing_at_lesser: i64) -> bool {
        self.cache
            .remove(&range_key(airing_at_greater, airing_at_lesser))
    }
}
