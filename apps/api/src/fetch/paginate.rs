//! Sequential pagination over a remote paged collection.
//!
//! Pages are fetched strictly in order because each page's `has_next_page`
//! flag gates the next request. Per-page failures are retried with the shared
//! [`RetryPolicy`]; a page that exhausts its retries truncates the result
//! rather than failing the whole fetch — callers always get a (possibly
//! partial) list, never an error.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::fetch::retry::{with_retry, RetryPolicy};

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

/// Supplier of pages, assumed idempotent per page number (retries re-request
/// the same page).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Item: Send;
    type Error: std::fmt::Display + Send;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, Self::Error>;
}

/// Fetches every page starting at 1 and concatenates the items.
///
/// The retry counter resets on each successful page. On retry exhaustion the
/// loop aborts and whatever was accumulated so far is returned.
pub async fn fetch_all_pages<F>(fetcher: &F, policy: &RetryPolicy) -> Vec<F::Item>
where
    F: PageFetcher,
{
    let mut items = Vec::new();
    let mut page = 1u32;
    loop {
        match with_retry(policy, || fetcher.fetch_page(page)).await {
            Ok(fetched) => {
                let has_next_page = fetched.has_next_page;
                items.extend(fetched.items);
                if !has_next_page {
                    break;
                }
                page += 1;
            }
            Err(err) => {
                error!(
                    page,
                    error = %err,
                    "page fetch failed after retries, returning partial results"
                );
                break;
            }
        }
    }
    debug!(pages = page, total = items.len(), "pagination finished");
    items
}
