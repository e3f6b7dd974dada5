use crate::ports::{BlocklistLoaderPort, BlocklistStorePort, LoadReport};
use sentinel_dns_domain::DomainError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Re-reads the blocklist file from disk and atomically swaps it into the
/// live store used by the DNS Proxy. Used both at startup and by the
/// Control Interface's reload endpoint.
pub struct ReloadBlocklistUseCase {
    loader: Arc<dyn BlocklistLoaderPort>,
    store: Arc<dyn BlocklistStorePort>,
    path: PathBuf,
}

impl ReloadBlocklistUseCase {
    pub fn new(
        loader: Arc<dyn BlocklistLoaderPort>,
        store: Arc<dyn BlocklistStorePort>,
        path: PathBuf,
    ) -> Self {
        Self { loader, store, path }
    }

    pub async fn execute(&self) -> Result<LoadReport, DomainError> {
        let (blocklist, report) = self.loader.load(&self.path).await?;
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            emergency_fallback = report.used_emergency_fallback,
            "loaded blocklist"
        );
        self.store.swap(blocklist);
        Ok(report)
    }
}
