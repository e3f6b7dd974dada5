use crate::errors::LifecycleError;
use crate::ports::{
    ConfiguratorError, DaemonStateRepositoryPort, DnsBackupRepositoryPort, DnsConfiguratorPort,
    DnsProbePort, ProxyControlPort,
};
use sentinel_dns_domain::{DaemonState, DnsBackup, Platform};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const FALLBACK_SECONDARY: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));

/// Flips system DNS between the loopback proxy and the host's original
/// resolvers. Holds its own lock so CLI, Control Interface, and the
/// startup sequence can all call `execute` without racing each other
/// (§4.4, "single writer").
pub struct ToggleBlockingUseCase {
    configurator: Arc<dyn DnsConfiguratorPort>,
    proxy: Arc<dyn ProxyControlPort>,
    probe: Arc<dyn DnsProbePort>,
    state_repo: Arc<dyn DaemonStateRepositoryPort>,
    backup_repo: Arc<dyn DnsBackupRepositoryPort>,
    lock: Mutex<()>,
}

impl ToggleBlockingUseCase {
    pub fn new(
        configurator: Arc<dyn DnsConfiguratorPort>,
        proxy: Arc<dyn ProxyControlPort>,
        probe: Arc<dyn DnsProbePort>,
        state_repo: Arc<dyn DaemonStateRepositoryPort>,
        backup_repo: Arc<dyn DnsBackupRepositoryPort>,
    ) -> Self {
        Self {
            configurator,
            proxy,
            probe,
            state_repo,
            backup_repo,
            lock: Mutex::new(()),
        }
    }

    pub async fn execute(&self, enable: bool) -> Result<DaemonState, LifecycleError> {
        let _guard = self.lock.lock().await;

        if let Some(current) = self.state_repo.load().await? {
            if current.is_blocking == enable {
                return Err(LifecycleError::NoOp(if enable { "enabled" } else { "disabled" }));
            }
        }

        self.apply(enable).await
    }

    /// Applies `enable` unconditionally, bypassing the "already in this
    /// state" guard above. Used by the Lifecycle Manager to resume
    /// blocking at startup from persisted intent, where the on-disk state
    /// already agrees with the desired value but the OS's actual resolver
    /// config cannot be trusted to match it after a crash.
    pub async fn resume(&self, enable: bool) -> Result<DaemonState, LifecycleError> {
        let _guard = self.lock.lock().await;
        self.apply(enable).await
    }

    async fn apply(&self, enable: bool) -> Result<DaemonState, LifecycleError> {
        let interface = self.configurator.detect_interface().await?;

        if enable {
            self.enable(&interface).await?
        } else {
            self.disable(&interface).await?
        }

        let state = DaemonState::new(enable, env!("CARGO_PKG_VERSION"));
        self.state_repo.save(&state).await?;
        info!(interface, is_blocking = enable, "toggled system DNS");
        Ok(state)
    }

    async fn enable(&self, interface: &str) -> Result<(), LifecycleError> {
        let proxy_addr = match self.proxy.bound_addr() {
            Some(addr) => addr,
            None => self.proxy.start().await?,
        };

        if !self.probe.resolve_a("sentinel-dns.health-check.invalid", proxy_addr).await {
            return Err(LifecycleError::Configurator(ConfiguratorError::ProxyNotAnswering));
        }

        let current = self.configurator.read_current_resolvers(interface).await?;
        if !current.is_poisoned() {
            let backup = DnsBackup {
                timestamp: chrono::Utc::now(),
                platform: Platform::current(),
                interface: interface.to_string(),
                original_resolvers: current,
            };
            self.backup_repo.save(&backup).await?;
        }

        let SocketAddr::V4(v4) = proxy_addr else {
            return Err(LifecycleError::ProxyNotIpv4);
        };
        self.configurator
            .apply_resolvers(interface, IpAddr::V4(*v4.ip()), FALLBACK_SECONDARY)
            .await?;
        Ok(())
    }

    async fn disable(&self, interface: &str) -> Result<(), LifecycleError> {
        match self.backup_repo.load().await? {
            Some(backup) if !backup.original_resolvers.is_poisoned() => {
                self.configurator.apply_backup(interface, &backup).await?;
            }
            _ => {
                self.configurator.restore_automatic(interface).await?;
            }
        }
        Ok(())
    }
}
