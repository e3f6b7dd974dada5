use crate::ports::{BlocklistStorePort, DaemonStateRepositoryPort, ProxyControlPort};
use sentinel_dns_domain::{DomainError, Statistics};
use std::sync::Arc;

/// This system has exactly one way of blocking queries; surfaced so the
/// Control Interface's `/status` shape leaves room for other mechanisms
/// without a breaking change.
const BLOCKING_METHOD: &str = "loopback-proxy";

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub is_running: bool,
    pub is_blocking: bool,
    pub domains_in_list: usize,
    pub queries_seen: u64,
    pub queries_blocked: u64,
    pub queries_allowed: u64,
    pub blocking_method: &'static str,
    pub uptime_secs: u64,
}

/// Reads the current system state for the CLI `--status` flag and the
/// Control Interface's `/status` endpoint, without mutating anything.
pub struct GetStatusUseCase {
    state_repo: Arc<dyn DaemonStateRepositoryPort>,
    proxy: Arc<dyn ProxyControlPort>,
    blocklist: Arc<dyn BlocklistStorePort>,
    statistics: Arc<Statistics>,
}

impl GetStatusUseCase {
    pub fn new(
        state_repo: Arc<dyn DaemonStateRepositoryPort>,
        proxy: Arc<dyn ProxyControlPort>,
        blocklist: Arc<dyn BlocklistStorePort>,
        statistics: Arc<Statistics>,
    ) -> Self {
        Self {
            state_repo,
            proxy,
            blocklist,
            statistics,
        }
    }

    pub async fn execute(&self) -> Result<StatusReport, DomainError> {
        let is_blocking = self
            .state_repo
            .load()
            .await?
            .map(|s| s.is_blocking)
            .unwrap_or(false);
        let list = self.blocklist.current();
        let snapshot = self.statistics.snapshot();
        Ok(StatusReport {
            is_running: self.proxy.is_bound(),
            is_blocking,
            domains_in_list: list.len(),
            queries_seen: snapshot.queries_seen,
            queries_blocked: snapshot.queries_blocked,
            queries_allowed: snapshot.queries_allowed,
            blocking_method: BLOCKING_METHOD,
            uptime_secs: snapshot.uptime_secs,
        })
    }
}
