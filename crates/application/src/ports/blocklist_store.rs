use sentinel_dns_domain::Blocklist;
use std::sync::Arc;

/// Lock-free shared handle to the currently active `Blocklist` snapshot.
/// The DNS Proxy reads through this on every query; `ReloadBlocklistUseCase`
/// swaps in a freshly loaded snapshot without ever blocking readers.
pub trait BlocklistStorePort: Send + Sync {
    fn current(&self) -> Arc<Blocklist>;
    fn swap(&self, new: Blocklist);
}
