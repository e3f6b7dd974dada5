use async_trait::async_trait;
use sentinel_dns_domain::{Blocklist, DomainError};
use std::path::Path;

/// Outcome of a blocklist parse: the accepted set plus diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
    pub used_emergency_fallback: bool,
}

/// Application-layer port for loading a `Blocklist` snapshot from
/// whatever source the infrastructure layer implements (a JSON file, in
/// the current adapter).
#[async_trait]
pub trait BlocklistLoaderPort: Send + Sync {
    async fn load(&self, path: &Path) -> Result<(Blocklist, LoadReport), DomainError>;
}
