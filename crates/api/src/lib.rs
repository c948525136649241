//! Topdeck public API façade.
//!
//! This crate defines the capability traits and error taxonomy the
//! frontends depend on, with a mock implementation for tests and an HTTP
//! implementation speaking the broker console REST surface.

#![forbid(unsafe_code)]

use std::sync::Mutex;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use topdeck_core::{TopicsPage, TopicsRequest};

/// API errors suitable for transport over RPC later.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum ApiError {
    #[error("capability: {0}")]
    Capability(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Per-name rejection inside an otherwise accepted bulk call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of a bulk mutation. The optimistic controller path discards
/// it; stricter callers can inspect `failed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkStatus {
    pub requested: usize,
    pub failed: Vec<BulkFailure>,
}

impl BulkStatus {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Declarative topics API surface.
#[async_trait::async_trait]
pub trait TopicsApi: Send + Sync {
    /// One page of topics for the canonical request.
    async fn list_topics(&self, req: &TopicsRequest) -> ApiResult<TopicsPage>;

    /// Delete the named topics under the cluster scope.
    async fn delete_topics(&self, cluster: &str, names: &[String]) -> ApiResult<BulkStatus>;

    /// Purge the records of the named topics without deleting the topics
    /// themselves, optionally restricted to a partition subset.
    async fn purge_topics(
        &self,
        cluster: &str,
        names: &[String],
        partitions: Option<&[u32]>,
    ) -> ApiResult<BulkStatus>;
}

// ----------------- Mock implementation -----------------

/// In-memory mock for tests: serves a fixed page and records every call.
#[derive(Default)]
pub struct MockApi {
    pub page: TopicsPage,
    pub list_calls: Mutex<Vec<TopicsRequest>>,
    pub deleted: Mutex<Vec<(String, Vec<String>)>>,
    pub purged: Mutex<Vec<(String, Vec<String>, Option<Vec<u32>>)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: TopicsPage) -> Self {
        Self { page, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl TopicsApi for MockApi {
    async fn list_topics(&self, req: &TopicsRequest) -> ApiResult<TopicsPage> {
        self.list_calls.lock().unwrap().push(req.clone());
        Ok(self.page.clone())
    }

    async fn delete_topics(&self, cluster: &str, names: &[String]) -> ApiResult<BulkStatus> {
        self.deleted.lock().unwrap().push((cluster.to_string(), names.to_vec()));
        Ok(BulkStatus { requested: names.len(), failed: Vec::new() })
    }

    async fn purge_topics(
        &self,
        cluster: &str,
        names: &[String],
        partitions: Option<&[u32]>,
    ) -> ApiResult<BulkStatus> {
        self.purged.lock().unwrap().push((
            cluster.to_string(),
            names.to_vec(),
            partitions.map(|p| p.to_vec()),
        ));
        Ok(BulkStatus { requested: names.len(), failed: Vec::new() })
    }
}

// ----------------- HTTP implementation -----------------

/// REST client for the broker console API.
///
/// If the base URL carries a path prefix it must end with a trailing
/// slash, otherwise `Url::join` replaces the last segment.
pub struct HttpApi {
    http: reqwest::Client,
    base: url::Url,
}

impl HttpApi {
    pub fn new(base: url::Url) -> Self {
        Self { http: reqwest::Client::new(), base }
    }

    fn topics_url(&self, cluster: &str) -> ApiResult<url::Url> {
        self.base
            .join(&format!("api/clusters/{}/topics", cluster))
            .map_err(|e| ApiError::Validation(format!("bad console url: {}", e)))
    }

    fn topic_url(&self, cluster: &str, name: &str) -> ApiResult<url::Url> {
        self.base
            .join(&format!("api/clusters/{}/topics/{}", cluster, name))
            .map_err(|e| ApiError::Validation(format!("bad console url: {}", e)))
    }

    fn messages_url(
        &self,
        cluster: &str,
        name: &str,
        partitions: Option<&[u32]>,
    ) -> ApiResult<url::Url> {
        let mut url = self
            .base
            .join(&format!("api/clusters/{}/topics/{}/messages", cluster, name))
            .map_err(|e| ApiError::Validation(format!("bad console url: {}", e)))?;
        if let Some(parts) = partitions {
            let joined = parts
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(",");
            url.query_pairs_mut().append_pair("partitions", &joined);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl TopicsApi for HttpApi {
    async fn list_topics(&self, req: &TopicsRequest) -> ApiResult<TopicsPage> {
        req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
        let t0 = Instant::now();
        let mut url = self.topics_url(&req.cluster)?;
        url.query_pairs_mut().extend_pairs(req.query_pairs());
        info!(cluster = %req.cluster, page = req.page, per_page = req.per_page, search = %req.search, "api: list topics start");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("cluster {}", req.cluster)));
        }
        if !resp.status().is_success() {
            return Err(ApiError::Internal(format!("list topics: http {}", resp.status())));
        }
        let page: TopicsPage = resp
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        info!(topics = page.topics.len(), total_pages = page.total_pages, took_ms = %t0.elapsed().as_millis(), "api: list topics ok");
        Ok(page)
    }

    async fn delete_topics(&self, cluster: &str, names: &[String]) -> ApiResult<BulkStatus> {
        let t0 = Instant::now();
        info!(cluster = %cluster, count = names.len(), "api: bulk delete start");
        let mut status = BulkStatus { requested: names.len(), failed: Vec::new() };
        for name in names {
            let url = self.topic_url(cluster, name)?;
            match self.http.delete(url).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    warn!(cluster = %cluster, topic = %name, status = %resp.status(), "api: delete rejected");
                    status.failed.push(BulkFailure {
                        name: name.clone(),
                        reason: format!("http {}", resp.status()),
                    });
                }
                Err(e) => {
                    warn!(cluster = %cluster, topic = %name, error = %e, "api: delete failed");
                    status.failed.push(BulkFailure { name: name.clone(), reason: e.to_string() });
                }
            }
        }
        info!(cluster = %cluster, failed = status.failed.len(), took_ms = %t0.elapsed().as_millis(), "api: bulk delete done");
        Ok(status)
    }

    async fn purge_topics(
        &self,
        cluster: &str,
        names: &[String],
        partitions: Option<&[u32]>,
    ) -> ApiResult<BulkStatus> {
        let t0 = Instant::now();
        info!(cluster = %cluster, count = names.len(), partitions = ?partitions, "api: bulk purge start");
        let mut status = BulkStatus { requested: names.len(), failed: Vec::new() };
        for name in names {
            let url = self.messages_url(cluster, name, partitions)?;
            match self.http.delete(url).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    warn!(cluster = %cluster, topic = %name, status = %resp.status(), "api: purge rejected");
                    status.failed.push(BulkFailure {
                        name: name.clone(),
                        reason: format!("http {}", resp.status()),
                    });
                }
                Err(e) => {
                    warn!(cluster = %cluster, topic = %name, error = %e, "api: purge failed");
                    status.failed.push(BulkFailure { name: name.clone(), reason: e.to_string() });
                }
            }
        }
        info!(cluster = %cluster, failed = status.failed.len(), took_ms = %t0.elapsed().as_millis(), "api: bulk purge done");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topdeck_core::{SortField, SortSpec, TopicSummary, TopicsQuery};

    fn api() -> HttpApi {
        HttpApi::new(url::Url::parse("http://127.0.0.1:8080/").unwrap())
    }

    #[tokio::test]
    async fn mock_serves_its_page_and_records_calls() {
        let page = TopicsPage {
            topics: vec![TopicSummary { name: "orders".into(), ..TopicSummary::default() }],
            total_pages: 4,
        };
        let mock = MockApi::with_page(page);
        let req = TopicsQuery::new("local").request();

        let got = mock.list_topics(&req).await.unwrap();
        assert_eq!(got.topics.len(), 1);
        assert_eq!(got.total_pages, 4);
        assert_eq!(mock.list_calls.lock().unwrap().len(), 1);

        let status = mock.delete_topics("local", &["orders".to_string()]).await.unwrap();
        assert!(status.all_ok());
        assert_eq!(mock.deleted.lock().unwrap().len(), 1);
    }

    #[test]
    fn list_url_omits_sort_params_when_unset() {
        let req = TopicsQuery::new("local").request();
        let mut url = api().topics_url(&req.cluster).unwrap();
        url.query_pairs_mut().extend_pairs(req.query_pairs());
        let s = url.as_str();
        assert!(s.starts_with("http://127.0.0.1:8080/api/clusters/local/topics?"));
        assert!(s.contains("page=1"));
        assert!(s.contains("perPage=25"));
        assert!(s.contains("showInternal=true"));
        assert!(!s.contains("orderBy"));
        assert!(!s.contains("sortOrder"));
    }

    #[test]
    fn list_url_carries_sort_and_search() {
        let mut q = TopicsQuery::new("local");
        q.set_search("orders");
        q.set_sort(Some(SortSpec::asc(SortField::TotalPartitions)));
        let req = q.request();
        let mut url = api().topics_url(&req.cluster).unwrap();
        url.query_pairs_mut().extend_pairs(req.query_pairs());
        let s = url.as_str();
        assert!(s.contains("orderBy=TOTAL_PARTITIONS"));
        assert!(s.contains("sortOrder=ASC"));
        assert!(s.contains("search=orders"));
    }

    #[test]
    fn messages_url_encodes_partition_subset() {
        let url = api().messages_url("local", "orders", Some(&[0, 2, 5])).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/clusters/local/topics/orders/messages?partitions=0%2C2%2C5"
        );
        let url = api().messages_url("local", "orders", None).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/clusters/local/topics/orders/messages"
        );
    }
}
