#![forbid(unsafe_code)]

//! Fetch issuance: one spawned task per request.
//!
//! Pages land in the listing feed out of band; the feed's last-write-wins
//! swap absorbs superseded fetches that resolve late. No retries, no
//! cancellation.

use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tracing::{info, warn};

use topdeck_api::{ApiError, ApiResult, TopicsApi};
use topdeck_core::TopicsRequest;
use topdeck_store::ListingPublisher;

/// Fire-and-forget fetch capability. Only synchronous issuance failures
/// are reported here; results and remote errors arrive via the feed.
pub trait FetchTopics: Send + Sync {
    fn fetch(&self, req: TopicsRequest) -> ApiResult<()>;
}

/// Production fetcher: validates the request, marks the feed loading and
/// spawns a task that lists topics and publishes the page.
pub struct SpawnFetcher {
    api: Arc<dyn TopicsApi>,
    publisher: ListingPublisher,
}

impl SpawnFetcher {
    pub fn new(api: Arc<dyn TopicsApi>, publisher: ListingPublisher) -> Self {
        Self { api, publisher }
    }
}

impl FetchTopics for SpawnFetcher {
    fn fetch(&self, req: TopicsRequest) -> ApiResult<()> {
        req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
        counter!("ctrl_fetch_issued_total", 1);
        self.publisher.begin();
        let api = Arc::clone(&self.api);
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            let t0 = Instant::now();
            match api.list_topics(&req).await {
                Ok(page) => {
                    info!(cluster = %req.cluster, topics = page.topics.len(), took_ms = %t0.elapsed().as_millis(), "fetch: topics page ready");
                    publisher.publish(page);
                }
                Err(e) => {
                    warn!(cluster = %req.cluster, error = %e, took_ms = %t0.elapsed().as_millis(), "fetch: topics list failed");
                    publisher.fail();
                }
            }
        });
        Ok(())
    }
}
