use crate::errors::LifecycleError;
use crate::ports::{
    DaemonStateRepositoryPort, DnsConfiguratorPort, DnsProbePort, PidRepositoryPort,
    ProxyControlPort,
};
use crate::use_cases::ToggleBlockingUseCase;
use sentinel_dns_domain::PidRecord;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::{info, warn};

/// Well-known public resolver used only to confirm external resolution
/// works again after an automatic-DNS restore; the daemon never sends
/// ordinary traffic here.
const INTEGRITY_CHECK_SERVER: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53);
const INTEGRITY_CHECK_NAME: &str = "example.com";

/// Owns the daemon's startup and shutdown sequences (§4.4). Everything
/// here talks to ports only — it has no knowledge of sockets, subprocess
/// calls, or file formats.
pub struct LifecycleManager {
    pid_repo: Arc<dyn PidRepositoryPort>,
    state_repo: Arc<dyn DaemonStateRepositoryPort>,
    configurator: Arc<dyn DnsConfiguratorPort>,
    proxy: Arc<dyn ProxyControlPort>,
    probe: Arc<dyn DnsProbePort>,
    toggle: Arc<ToggleBlockingUseCase>,
}

impl LifecycleManager {
    pub fn new(
        pid_repo: Arc<dyn PidRepositoryPort>,
        state_repo: Arc<dyn DaemonStateRepositoryPort>,
        configurator: Arc<dyn DnsConfiguratorPort>,
        proxy: Arc<dyn ProxyControlPort>,
        probe: Arc<dyn DnsProbePort>,
        toggle: Arc<ToggleBlockingUseCase>,
    ) -> Self {
        Self {
            pid_repo,
            state_repo,
            configurator,
            proxy,
            probe,
            toggle,
        }
    }

    /// Runs before anything else touches the network or the filesystem:
    /// enforces single-instance, recovers a poisoned live resolver config
    /// left by a crashed prior run, brings the proxy up, then re-applies
    /// whatever blocking state was last persisted.
    pub async fn startup(&self) -> Result<(), LifecycleError> {
        self.enforce_single_instance().await?;
        self.pid_repo.save(&PidRecord::for_current_process()).await?;
        self.recover_poisoned_backup().await?;
        self.proxy.start().await?;
        if self.last_known_intent().await? {
            info!("resuming blocking from persisted daemon state");
            self.toggle.resume(true).await?;
        }
        Ok(())
    }

    async fn enforce_single_instance(&self) -> Result<(), LifecycleError> {
        if let Some(existing) = self.pid_repo.load().await? {
            if self.pid_repo.process_is_alive(existing.pid) {
                return Err(LifecycleError::AlreadyRunning(existing.pid));
            }
            warn!(
                pid = existing.pid,
                "found stale pid file from a crashed run, continuing"
            );
        }
        Ok(())
    }

    /// The OS can only be pointed at the loopback proxy if a previous run
    /// configured it that way — if that run then crashed instead of
    /// restoring on exit, the host is left resolving through a proxy that
    /// is no longer running. Detect that by reading the live resolver
    /// config (§4.3 "integrity check on startup"), not the on-disk backup,
    /// since the backup is only ever written with a known-clean value
    /// (`toggle_blocking.rs`'s `enable` refuses to persist a poisoned one).
    async fn recover_poisoned_backup(&self) -> Result<(), LifecycleError> {
        if self.proxy.is_bound() {
            return Ok(());
        }
        let interface = self.configurator.detect_interface().await?;
        let current = self.configurator.read_current_resolvers(&interface).await?;
        if !current.is_poisoned() {
            return Ok(());
        }
        warn!(
            interface,
            "host is still pointed at the loopback proxy from a crashed run, restoring automatic DNS"
        );
        self.configurator.restore_automatic(&interface).await?;

        if !self
            .probe
            .resolve_a(INTEGRITY_CHECK_NAME, INTEGRITY_CHECK_SERVER)
            .await
        {
            return Err(LifecycleError::DnsIntegrityFailed { interface });
        }
        Ok(())
    }

    /// Runs on a clean (SIGTERM/SIGINT/Ctrl-C) shutdown: restores DNS if it
    /// was pointed at the proxy, then stops the listener and releases the
    /// pid file so the next start doesn't see a stale lock.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        match self.toggle.execute(false).await {
            Ok(_) | Err(LifecycleError::NoOp(_)) => {}
            Err(err) => warn!(%err, "failed to restore DNS during shutdown"),
        }
        self.proxy.stop().await;
        self.pid_repo.remove().await?;
        info!("lifecycle shutdown complete");
        Ok(())
    }

    /// Intent last persisted before this process (re)started, used by the
    /// CLI's `--status` flag and to decide whether a fresh start should
    /// re-apply blocking automatically.
    pub async fn last_known_intent(&self) -> Result<bool, LifecycleError> {
        Ok(self
            .state_repo
            .load()
            .await?
            .map(|s| s.is_blocking)
            .unwrap_or(false))
    }
}
