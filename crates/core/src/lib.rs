//! Topdeck core types.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod query;

pub use query::{InvalidRequest, TopicsQuery, TopicsRequest};

/// Default rows per page when the caller's page store carries no value.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Unique key for one list row: a topic name under its cluster scope.
/// Within one list response, `name` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TopicRef {
    pub cluster: String,
    pub name: String,
}

/// Sortable list columns, as served by the console API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortField {
    Name,
    TotalPartitions,
    OutOfSyncReplicas,
}

impl SortField {
    /// Wire name for the `orderBy` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Name => "NAME",
            SortField::TotalPartitions => "TOTAL_PARTITIONS",
            SortField::OutOfSyncReplicas => "OUT_OF_SYNC_REPLICAS",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Active sort: exactly one column plus direction. Absence
/// (`Option::None` at the use site) means the remote default ordering
/// applies and no sort parameters are sent at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self { field, order: SortOrder::Asc }
    }

    pub fn desc(field: SortField) -> Self {
        Self { field, order: SortOrder::Desc }
    }
}

/// One topic row with its listing metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub name: String,
    #[serde(default)]
    pub internal: bool,
    /// Partition ids, used by the partitions column and purge subsets.
    #[serde(default)]
    pub partition_ids: SmallVec<[u32; 8]>,
    #[serde(default)]
    pub replication_factor: u16,
    #[serde(default)]
    pub out_of_sync_replicas: u32,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub size_bytes: u64,
}

impl TopicSummary {
    pub fn partition_count(&self) -> usize {
        self.partition_ids.len()
    }
}

/// One fetched page as returned by the data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsPage {
    pub topics: Vec<TopicSummary>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Epoch-stamped page held by the listing feed. Readers treat it as
/// immutable; each completed fetch swaps in a fresh one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicsSnapshot {
    pub epoch: u64,
    pub topics: Vec<TopicSummary>,
    pub total_pages: u32,
}

pub mod prelude {
    pub use super::{
        SortField, SortOrder, SortSpec, TopicRef, TopicSummary, TopicsPage, TopicsQuery,
        TopicsRequest, TopicsSnapshot,
    };
}
