#![forbid(unsafe_code)]

//! Fire-and-forget dispatch of destructive operations.
//!
//! Each call spawns a task, logs the outcome and hands the join handle
//! back so callers may either drop it (the optimistic path) or await the
//! downstream status.

use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use topdeck_api::{ApiResult, BulkStatus, TopicsApi};

/// Handle on an in-flight bulk operation.
pub type BulkTask = JoinHandle<ApiResult<BulkStatus>>;

pub struct BulkDispatcher {
    api: Arc<dyn TopicsApi>,
}

impl BulkDispatcher {
    pub fn new(api: Arc<dyn TopicsApi>) -> Self {
        Self { api }
    }

    pub fn delete(&self, cluster: String, names: Vec<String>) -> BulkTask {
        counter!("ctrl_bulk_delete_total", 1);
        info!(cluster = %cluster, count = names.len(), "ops: bulk delete start");
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let res = api.delete_topics(&cluster, &names).await;
            log_outcome("delete", &cluster, names.len(), &res);
            res
        })
    }

    pub fn purge(
        &self,
        cluster: String,
        names: Vec<String>,
        partitions: Option<Vec<u32>>,
    ) -> BulkTask {
        counter!("ctrl_bulk_purge_total", 1);
        info!(cluster = %cluster, count = names.len(), partitions = ?partitions, "ops: bulk purge start");
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let res = api.purge_topics(&cluster, &names, partitions.as_deref()).await;
            log_outcome("purge", &cluster, names.len(), &res);
            res
        })
    }
}

fn log_outcome(op: &str, cluster: &str, count: usize, res: &ApiResult<BulkStatus>) {
    match res {
        Ok(status) if status.all_ok() => info!(op, cluster = %cluster, count, "ops: bulk op ok"),
        Ok(status) => warn!(op, cluster = %cluster, failed = status.failed.len(), "ops: bulk op partial"),
        Err(e) => warn!(op, cluster = %cluster, error = %e, "ops: bulk op failed"),
    }
}
