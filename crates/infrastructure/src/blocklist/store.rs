use arc_swap::ArcSwap;
use sentinel_dns_application::ports::BlocklistStorePort;
use sentinel_dns_domain::Blocklist;
use std::sync::Arc;

/// Lock-free holder for the active `Blocklist` snapshot. Readers (the DNS
/// Proxy, on every query) take a cheap `Arc` clone via `load()`; a reload
/// swaps in a new snapshot without blocking them, mirroring the teacher's
/// `block_filter::engine` atomic-replace pattern.
pub struct ArcSwapBlocklistStore {
    inner: ArcSwap<Blocklist>,
}

impl ArcSwapBlocklistStore {
    pub fn new(initial: Blocklist) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }
}

impl BlocklistStorePort for ArcSwapBlocklistStore {
    fn current(&self) -> Arc<Blocklist> {
        self.inner.load_full()
    }

    fn swap(&self, new: Blocklist) {
        self.inner.store(Arc::new(new));
    }
}
