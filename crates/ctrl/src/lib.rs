//! Topdeck list controller.
//!
//! Reconciles the five list inputs (search, sort, page, page size,
//! internal-topic visibility) into canonical fetches, owns row
//! selection, and gates bulk destructive operations behind an explicit
//! confirmation step.

#![forbid(unsafe_code)]

pub mod confirm;
pub mod fetch;
pub mod nav;
pub mod ops;
pub mod selection;

use std::sync::Arc;

use tracing::{debug, info, warn};

use topdeck_api::{ApiResult, TopicsApi};
use topdeck_core::{SortSpec, TopicRef, TopicsQuery, TopicsRequest, TopicsSnapshot};
use topdeck_store::{listing_feed, ListingHandle};

pub use confirm::{ConfirmError, ConfirmGate, PendingAction};
pub use fetch::{FetchTopics, SpawnFetcher};
pub use nav::{MemoryPageStore, PageParams, PageStore};
pub use ops::{BulkDispatcher, BulkTask};
pub use selection::SelectionSet;

/// Composition root wiring query state, fetch orchestration, selection
/// and the confirmation gate into one externally observable contract.
///
/// Single-threaded: all mutation goes through `&mut self`; the only
/// async boundary is task spawning inside the injected capabilities.
/// The controller never blocks on a fetch, and in-flight fetches are
/// never cancelled; the listing feed's last-write-wins swap absorbs
/// superseded results.
pub struct ListController {
    query: TopicsQuery,
    selection: SelectionSet,
    gate: ConfirmGate,
    fetcher: Arc<dyn FetchTopics>,
    ops: BulkDispatcher,
    nav: Box<dyn PageStore>,
    listing: ListingHandle,
    last_request: Option<TopicsRequest>,
    purge_partitions: Option<Vec<u32>>,
    read_only: bool,
}

impl ListController {
    /// Wire a controller over `api` with the default spawn-based fetcher
    /// and a fresh listing feed.
    pub fn new(
        query: TopicsQuery,
        api: Arc<dyn TopicsApi>,
        nav: Box<dyn PageStore>,
        read_only: bool,
    ) -> Self {
        let (publisher, listing) = listing_feed();
        let fetcher = Arc::new(SpawnFetcher::new(Arc::clone(&api), publisher));
        Self::with_fetcher(query, fetcher, api, listing, nav, read_only)
    }

    /// Wire a controller from parts. Lets tests substitute the fetch
    /// capability and observe the listing feed from outside.
    pub fn with_fetcher(
        query: TopicsQuery,
        fetcher: Arc<dyn FetchTopics>,
        api: Arc<dyn TopicsApi>,
        listing: ListingHandle,
        nav: Box<dyn PageStore>,
        read_only: bool,
    ) -> Self {
        Self {
            query,
            selection: SelectionSet::default(),
            gate: ConfirmGate::default(),
            fetcher,
            ops: BulkDispatcher::new(api),
            nav,
            listing,
            last_request: None,
            purge_partitions: None,
            read_only,
        }
    }

    /// Issue the initial fetch for the mounted view.
    pub fn mount(&mut self) -> ApiResult<()> {
        self.refresh()
    }

    /// Issue a fetch iff the derived request differs from the last one
    /// sent, so rapid successive edits produce exactly one fetch per
    /// distinct request value.
    fn refresh(&mut self) -> ApiResult<()> {
        let req = self.query.request();
        if self.last_request.as_ref() == Some(&req) {
            return Ok(());
        }
        debug!(cluster = %req.cluster, page = req.page, per_page = req.per_page, search = %req.search, show_internal = req.show_internal, "ctrl: issuing fetch");
        self.fetcher.fetch(req.clone())?;
        self.last_request = Some(req);
        Ok(())
    }

    // ---- query state ----

    pub fn set_search(&mut self, text: impl Into<String>) -> ApiResult<()> {
        self.query.set_search(text);
        self.refresh()
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> ApiResult<()> {
        self.query.set_sort(sort);
        self.refresh()
    }

    pub fn set_page(&mut self, page: u32) -> ApiResult<()> {
        self.query.set_page(page);
        self.persist_pagination();
        self.refresh()
    }

    pub fn set_per_page(&mut self, per_page: u32) -> ApiResult<()> {
        self.query.set_per_page(per_page);
        self.persist_pagination();
        self.refresh()
    }

    /// Toggle internal-topic visibility. Resets to page 1 and writes the
    /// reset back to the external page store: the page number may be
    /// persisted outside this controller (query string), and must not
    /// survive a visibility change.
    pub fn set_show_internal(&mut self, on: bool) -> ApiResult<()> {
        self.query.set_show_internal(on);
        self.persist_pagination();
        self.refresh()
    }

    fn persist_pagination(&mut self) {
        self.nav.store(PageParams {
            page: self.query.page(),
            per_page: self.query.per_page(),
        });
    }

    // ---- selection ----

    /// Toggle one row. Refused while a confirmation is pending so the
    /// confirmed blast radius cannot drift from what the prompt showed.
    pub fn toggle_selected(&mut self, name: &str) {
        if self.gate.pending().is_some() {
            warn!(topic = %name, "ctrl: selection change ignored while confirmation pending");
            return;
        }
        self.selection.toggle(name);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.contains(name)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    // ---- confirmation ----

    /// Park a bulk delete pending confirmation. Callers only offer this
    /// when the selection is non-empty; an empty selection still
    /// transitions and the downstream call is a harmless no-op set.
    pub fn request_delete(&mut self) -> Result<(), ConfirmError> {
        self.guard_writable()?;
        self.gate.request(PendingAction::Delete)
    }

    pub fn request_purge(&mut self) -> Result<(), ConfirmError> {
        self.guard_writable()?;
        self.gate.request(PendingAction::Purge)
    }

    /// Restrict the next confirmed purge to a partition subset.
    pub fn set_purge_partitions(&mut self, partitions: Option<Vec<u32>>) {
        self.purge_partitions = partitions;
    }

    pub fn cancel(&mut self) {
        self.gate.cancel();
        self.purge_partitions = None;
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.gate.pending()
    }

    /// Prompt text for the pending action, if any.
    pub fn prompt(&self) -> Option<&'static str> {
        self.gate.pending().map(|a| a.prompt())
    }

    /// Confirm the pending action: snapshot the selection now, dispatch
    /// the bulk operation, clear the selection and return to idle. The
    /// dispatch is optimistic; the returned task carries the downstream
    /// outcome for callers that want it and may be dropped freely.
    pub fn confirm(&mut self) -> Result<BulkTask, ConfirmError> {
        let action = self.gate.confirm()?;
        let names = self.selection.snapshot();
        let cluster = self.query.cluster().to_string();
        info!(cluster = %cluster, count = names.len(), action = ?action, "ctrl: bulk action confirmed");
        let task = match action {
            PendingAction::Delete => self.ops.delete(cluster, names),
            PendingAction::Purge => self.ops.purge(cluster, names, self.purge_partitions.take()),
        };
        self.selection.clear();
        Ok(task)
    }

    // ---- single-row operations (row actions own their own prompts) ----

    pub fn delete_topic(&mut self, name: &str) -> Result<BulkTask, ConfirmError> {
        self.guard_writable()?;
        Ok(self
            .ops
            .delete(self.query.cluster().to_string(), vec![name.to_string()]))
    }

    pub fn purge_topic(
        &mut self,
        name: &str,
        partitions: Option<Vec<u32>>,
    ) -> Result<BulkTask, ConfirmError> {
        self.guard_writable()?;
        Ok(self
            .ops
            .purge(self.query.cluster().to_string(), vec![name.to_string()], partitions))
    }

    fn guard_writable(&self) -> Result<(), ConfirmError> {
        if self.read_only {
            warn!(cluster = %self.query.cluster(), "ctrl: destructive action refused on read-only cluster");
            return Err(ConfirmError::ReadOnly);
        }
        Ok(())
    }

    // ---- reads ----

    pub fn query(&self) -> &TopicsQuery {
        &self.query
    }

    /// Addressable reference for one row under this controller's scope,
    /// for detail views and row-level operations.
    pub fn topic_ref(&self, name: &str) -> TopicRef {
        TopicRef { cluster: self.query.cluster().to_string(), name: name.to_string() }
    }

    pub fn snapshot(&self) -> Arc<TopicsSnapshot> {
        self.listing.current()
    }

    pub fn is_loading(&self) -> bool {
        self.listing.is_loading()
    }

    pub fn listing(&self) -> ListingHandle {
        self.listing.clone()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }
}
