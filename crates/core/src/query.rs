//! Query state: the five independently-changing list inputs and the
//! canonical fetch request derived from them.

use serde::{Deserialize, Serialize};

use crate::{SortSpec, DEFAULT_PER_PAGE};

/// Canonical fetch parameters for the current query state plus scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicsRequest {
    pub cluster: String,
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    pub search: String,
    pub show_internal: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("cluster scope must not be empty")]
    EmptyCluster,
    #[error("page numbering starts at 1")]
    PageZero,
    #[error("per_page must be positive")]
    PerPageZero,
}

impl TopicsRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.cluster.is_empty() {
            return Err(InvalidRequest::EmptyCluster);
        }
        if self.page == 0 {
            return Err(InvalidRequest::PageZero);
        }
        if self.per_page == 0 {
            return Err(InvalidRequest::PerPageZero);
        }
        Ok(())
    }

    /// Query-string pairs for the console API. The sort pairs are
    /// omitted entirely when no sort is active (remote default order),
    /// and `search` is omitted when empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("orderBy", sort.field.as_param().to_string()));
            pairs.push(("sortOrder", sort.order.as_param().to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs.push(("showInternal", self.show_internal.to_string()));
        pairs
    }
}

/// Search text, sort spec, pagination and the internal-topics flag,
/// reconciled into one canonical request.
///
/// Invariant: changing any field other than `page` resets the page to 1;
/// pagination is not meaningful across a changed filter, sort or search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicsQuery {
    cluster: String,
    search: String,
    sort: Option<SortSpec>,
    page: u32,
    per_page: u32,
    show_internal: bool,
}

impl TopicsQuery {
    /// Fresh query for a cluster scope: empty search, remote default
    /// ordering, first page, internal topics visible.
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            search: String::new(),
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            show_internal: true,
        }
    }

    /// Seed pagination from externally persisted values (query string).
    pub fn with_pagination(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.max(1);
        self
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn show_internal(&self) -> bool {
        self.show_internal
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    pub fn set_show_internal(&mut self, on: bool) {
        self.show_internal = on;
        self.page = 1;
    }

    /// Canonical fetch parameters for the current values of all five
    /// fields plus the cluster scope.
    pub fn request(&self) -> TopicsRequest {
        TopicsRequest {
            cluster: self.cluster.clone(),
            page: self.page,
            per_page: self.per_page,
            sort: self.sort,
            search: self.search.clone(),
            show_internal: self.show_internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortField;

    #[test]
    fn non_page_changes_reset_page_to_one() {
        let mut q = TopicsQuery::new("local").with_pagination(7, 25);
        q.set_search("orders");
        assert_eq!(q.page(), 1);

        q.set_page(4);
        q.set_sort(Some(SortSpec::asc(SortField::Name)));
        assert_eq!(q.page(), 1);

        q.set_page(4);
        q.set_show_internal(false);
        assert_eq!(q.page(), 1);

        q.set_page(4);
        q.set_per_page(50);
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn set_page_keeps_other_fields() {
        let mut q = TopicsQuery::new("local");
        q.set_search("orders");
        q.set_page(3);
        assert_eq!(q.page(), 3);
        assert_eq!(q.search(), "orders");
    }

    #[test]
    fn derived_request_tracks_edit_sequence() {
        let mut q = TopicsQuery::new("local");
        assert_eq!(q.request().page, 1);
        assert_eq!(q.request().per_page, DEFAULT_PER_PAGE);
        assert!(q.request().show_internal);

        q.set_search("orders");
        let req = q.request();
        assert_eq!(req.search, "orders");
        assert_eq!(req.page, 1);

        q.set_page(3);
        assert_eq!(q.request().page, 3);

        q.set_search("orders-v2");
        let req = q.request();
        assert_eq!(req.search, "orders-v2");
        assert_eq!(req.page, 1);
    }

    #[test]
    fn page_and_per_page_are_clamped() {
        let mut q = TopicsQuery::new("local");
        q.set_page(0);
        assert_eq!(q.page(), 1);
        q.set_per_page(0);
        assert_eq!(q.per_page(), 1);
    }

    #[test]
    fn query_pairs_omit_sort_when_none() {
        let req = TopicsQuery::new("local").request();
        let keys: Vec<&str> = req.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert!(!keys.contains(&"orderBy"));
        assert!(!keys.contains(&"sortOrder"));
        assert!(!keys.contains(&"search"));
        assert!(keys.contains(&"showInternal"));
    }

    #[test]
    fn query_pairs_carry_sort_when_set() {
        let mut q = TopicsQuery::new("local");
        q.set_sort(Some(SortSpec::desc(SortField::OutOfSyncReplicas)));
        let pairs = q.request().query_pairs();
        assert!(pairs.contains(&("orderBy", "OUT_OF_SYNC_REPLICAS".to_string())));
        assert!(pairs.contains(&("sortOrder", "DESC".to_string())));
    }

    #[test]
    fn validate_rejects_degenerate_requests() {
        let mut req = TopicsQuery::new("local").request();
        assert_eq!(req.validate(), Ok(()));
        req.page = 0;
        assert_eq!(req.validate(), Err(InvalidRequest::PageZero));
        req.page = 1;
        req.per_page = 0;
        assert_eq!(req.validate(), Err(InvalidRequest::PerPageZero));
        req.per_page = 25;
        req.cluster.clear();
        assert_eq!(req.validate(), Err(InvalidRequest::EmptyCluster));
    }
}
