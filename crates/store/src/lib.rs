//! In-RAM listing feed: the shared read model fetch results land in.
//!
//! One writer side (the fetch tasks) swaps epoch-stamped snapshots in;
//! any number of readers observe the current page, a loading flag and an
//! epoch channel to wait on. Publishes are last-write-wins: a superseded
//! fetch that resolves late still swaps its page in, and the next fetch
//! overwrites it.

#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::debug;

use topdeck_core::{TopicsPage, TopicsSnapshot};

/// Create a connected publisher/handle pair over an empty snapshot.
pub fn listing_feed() -> (ListingPublisher, ListingHandle) {
    let snap = Arc::new(ArcSwap::from_pointee(TopicsSnapshot::default()));
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let publisher = ListingPublisher {
        snap: Arc::clone(&snap),
        epoch: Arc::new(AtomicU64::new(0)),
        epoch_tx: Arc::new(epoch_tx),
        in_flight: Arc::clone(&in_flight),
    };
    let handle = ListingHandle { snap, epoch_rx, in_flight };
    (publisher, handle)
}

/// Reader half: current snapshot, loading flag, epoch subscription.
#[derive(Clone)]
pub struct ListingHandle {
    snap: Arc<ArcSwap<TopicsSnapshot>>,
    epoch_rx: watch::Receiver<u64>,
    in_flight: Arc<AtomicUsize>,
}

impl ListingHandle {
    pub fn current(&self) -> Arc<TopicsSnapshot> {
        self.snap.load_full()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Relaxed) > 0
    }

    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> {
        self.epoch_rx.clone()
    }
}

/// Writer half, cloned into fetch tasks.
#[derive(Clone)]
pub struct ListingPublisher {
    snap: Arc<ArcSwap<TopicsSnapshot>>,
    epoch: Arc<AtomicU64>,
    epoch_tx: Arc<watch::Sender<u64>>,
    in_flight: Arc<AtomicUsize>,
}

impl ListingPublisher {
    /// Mark one fetch in flight.
    pub fn begin(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Swap in a completed page and wake epoch subscribers.
    pub fn publish(&self, page: TopicsPage) {
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;
        self.snap.store(Arc::new(TopicsSnapshot {
            epoch,
            topics: page.topics,
            total_pages: page.total_pages,
        }));
        let _ = self.epoch_tx.send(epoch);
        self.settle();
        debug!(epoch, "listing snapshot published");
    }

    /// Mark a failed fetch as settled without touching the snapshot.
    pub fn fail(&self) {
        self.settle();
    }

    fn settle(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topdeck_core::TopicSummary;

    fn topic(name: &str) -> TopicSummary {
        TopicSummary { name: name.to_string(), ..TopicSummary::default() }
    }

    fn page(names: &[&str], total_pages: u32) -> TopicsPage {
        TopicsPage { topics: names.iter().map(|n| topic(n)).collect(), total_pages }
    }

    #[test]
    fn publish_bumps_epoch_and_swaps_snapshot() {
        let (publisher, handle) = listing_feed();
        assert_eq!(handle.current().epoch, 0);

        publisher.publish(page(&["a", "b"], 3));
        let snap = handle.current();
        assert_eq!(snap.epoch, 1);
        assert_eq!(snap.total_pages, 3);
        assert_eq!(snap.topics.len(), 2);
        assert_eq!(*handle.subscribe_epoch().borrow(), 1);
    }

    #[test]
    fn late_publish_still_wins() {
        let (publisher, handle) = listing_feed();
        publisher.publish(page(&["fresh"], 1));
        // A superseded fetch resolving late overwrites unconditionally.
        publisher.publish(page(&["stale"], 9));
        let snap = handle.current();
        assert_eq!(snap.epoch, 2);
        assert_eq!(snap.topics[0].name, "stale");
        assert_eq!(snap.total_pages, 9);
    }

    #[test]
    fn loading_tracks_in_flight_fetches() {
        let (publisher, handle) = listing_feed();
        assert!(!handle.is_loading());

        publisher.begin();
        publisher.begin();
        assert!(handle.is_loading());

        publisher.fail();
        assert!(handle.is_loading());
        publisher.publish(page(&[], 0));
        assert!(!handle.is_loading());
    }
}
