use crate::di::{DnsServices, Repositories};
use sentinel_dns_application::use_cases::{
    GetStatsUseCase, GetStatusUseCase, ReloadBlocklistUseCase, ToggleBlockingUseCase,
};
use sentinel_dns_domain::Config;
use std::sync::Arc;

/// Application use cases, each wired from whichever repositories and DNS
/// services it needs. Shared `Arc<ToggleBlockingUseCase>` so the CLI, the
/// Control Interface, and the Lifecycle Manager's shutdown path all call
/// through the same single-writer lock.
pub struct UseCases {
    pub status: Arc<GetStatusUseCase>,
    pub stats: Arc<GetStatsUseCase>,
    pub toggle: Arc<ToggleBlockingUseCase>,
    pub reload: Arc<ReloadBlocklistUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, repos: &Repositories, dns: &DnsServices) -> Self {
        let toggle = Arc::new(ToggleBlockingUseCase::new(
            dns.configurator.clone(),
            dns.proxy.clone(),
            dns.probe.clone(),
            repos.state.clone(),
            repos.backup.clone(),
        ));

        let status = Arc::new(GetStatusUseCase::new(
            repos.state.clone(),
            dns.proxy.clone(),
            repos.blocklist_store.clone(),
            dns.statistics.clone(),
        ));

        let stats = Arc::new(GetStatsUseCase::new(dns.statistics.clone()));

        let reload = Arc::new(ReloadBlocklistUseCase::new(
            repos.blocklist_loader.clone(),
            repos.blocklist_store.clone(),
            config.blocking.blocklist_path.clone(),
        ));

        Self {
            status,
            stats,
            toggle,
            reload,
        }
    }
}
