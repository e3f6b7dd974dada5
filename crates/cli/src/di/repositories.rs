use sentinel_dns_application::ports::{
    BlocklistLoaderPort, BlocklistStorePort, DaemonStateRepositoryPort, DnsBackupRepositoryPort,
    PidRepositoryPort,
};
use sentinel_dns_domain::{Blocklist, Config};
use sentinel_dns_infrastructure::blocklist::{ArcSwapBlocklistStore, FileBlocklistLoader};
use sentinel_dns_infrastructure::repositories::{
    FileDaemonStateRepository, FileDnsBackupRepository, FilePidRepository,
};
use std::collections::HashSet;
use std::sync::Arc;

/// File-backed adapters for every repository port, built from the loaded
/// configuration's state-directory paths.
pub struct Repositories {
    pub pid: Arc<dyn PidRepositoryPort>,
    pub state: Arc<dyn DaemonStateRepositoryPort>,
    pub backup: Arc<dyn DnsBackupRepositoryPort>,
    pub blocklist_store: Arc<dyn BlocklistStorePort>,
    pub blocklist_loader: Arc<dyn BlocklistLoaderPort>,
}

impl Repositories {
    pub fn new(config: &Config) -> Self {
        Self {
            pid: Arc::new(FilePidRepository::new(config.state.pid_path.clone())),
            state: Arc::new(FileDaemonStateRepository::new(config.state.state_path.clone())),
            backup: Arc::new(FileDnsBackupRepository::new(config.state.backup_path.clone())),
            blocklist_store: Arc::new(ArcSwapBlocklistStore::new(Blocklist::new(HashSet::new(), 0))),
            blocklist_loader: Arc::new(FileBlocklistLoader::new()),
        }
    }
}
