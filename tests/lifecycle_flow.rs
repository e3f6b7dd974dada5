//! Lifecycle/toggle flows exercised against in-memory fakes of every
//! port, so the orchestration logic in `application` is tested without
//! touching real sockets or subprocesses.

use async_trait::async_trait;
use sentinel_dns_application::ports::{
    ConfiguratorError, DaemonStateRepositoryPort, DnsBackupRepositoryPort, DnsConfiguratorPort,
    DnsProbePort, PidRepositoryPort, ProxyControlPort, ProxyError,
};
use sentinel_dns_application::services::LifecycleManager;
use sentinel_dns_application::use_cases::ToggleBlockingUseCase;
use sentinel_dns_application::LifecycleError;
use sentinel_dns_domain::{DaemonState, DnsBackup, DomainError, OriginalResolvers, PidRecord, Platform};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct FakeConfigurator {
    interface: String,
    current_resolvers: Mutex<OriginalResolvers>,
    applied: Mutex<Vec<(IpAddr, IpAddr)>>,
    restored: AtomicBool,
}

impl FakeConfigurator {
    fn new(original: OriginalResolvers) -> Self {
        Self {
            interface: "eth0".to_string(),
            current_resolvers: Mutex::new(original),
            applied: Mutex::new(Vec::new()),
            restored: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DnsConfiguratorPort for FakeConfigurator {
    async fn detect_interface(&self) -> Result<String, ConfiguratorError> {
        Ok(self.interface.clone())
    }

    async fn read_current_resolvers(&self, _interface: &str) -> Result<OriginalResolvers, ConfiguratorError> {
        Ok(self.current_resolvers.lock().unwrap().clone())
    }

    async fn apply_resolvers(
        &self,
        _interface: &str,
        primary: IpAddr,
        secondary: IpAddr,
    ) -> Result<(), ConfiguratorError> {
        self.applied.lock().unwrap().push((primary, secondary));
        *self.current_resolvers.lock().unwrap() =
            OriginalResolvers::List(vec![primary.to_string(), secondary.to_string()]);
        Ok(())
    }

    async fn apply_backup(&self, _interface: &str, backup: &DnsBackup) -> Result<(), ConfiguratorError> {
        *self.current_resolvers.lock().unwrap() = backup.original_resolvers.clone();
        Ok(())
    }

    async fn restore_automatic(&self, _interface: &str) -> Result<(), ConfiguratorError> {
        self.restored.store(true, Ordering::SeqCst);
        *self.current_resolvers.lock().unwrap() = OriginalResolvers::dhcp();
        Ok(())
    }
}

struct FakeProxy {
    bound: Mutex<Option<SocketAddr>>,
}

impl FakeProxy {
    fn new() -> Self {
        Self { bound: Mutex::new(None) }
    }
}

#[async_trait]
impl ProxyControlPort for FakeProxy {
    async fn start(&self) -> Result<SocketAddr, ProxyError> {
        let addr: SocketAddr = "127.0.0.1:5353".parse().unwrap();
        *self.bound.lock().unwrap() = Some(addr);
        Ok(addr)
    }

    async fn stop(&self) {
        *self.bound.lock().unwrap() = None;
    }

    fn bound_addr(&self) -> Option<SocketAddr> {
        *self.bound.lock().unwrap()
    }

    fn is_bound(&self) -> bool {
        self.bound.lock().unwrap().is_some()
    }
}

struct FakeProbe {
    answers: AtomicBool,
}

impl FakeProbe {
    fn new(answers: bool) -> Self {
        Self { answers: AtomicBool::new(answers) }
    }
}

#[async_trait]
impl DnsProbePort for FakeProbe {
    async fn resolve_a(&self, _name: &str, _server: SocketAddr) -> bool {
        self.answers.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct FakeStateRepo {
    state: Mutex<Option<DaemonState>>,
}

#[async_trait]
impl DaemonStateRepositoryPort for FakeStateRepo {
    async fn load(&self) -> Result<Option<DaemonState>, DomainError> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &DaemonState) -> Result<(), DomainError> {
        *self.state.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeBackupRepo {
    backup: Mutex<Option<DnsBackup>>,
}

#[async_trait]
impl DnsBackupRepositoryPort for FakeBackupRepo {
    async fn load(&self) -> Result<Option<DnsBackup>, DomainError> {
        Ok(self.backup.lock().unwrap().clone())
    }

    async fn save(&self, backup: &DnsBackup) -> Result<(), DomainError> {
        *self.backup.lock().unwrap() = Some(backup.clone());
        Ok(())
    }
}

struct FakePidRepo {
    record: Mutex<Option<PidRecord>>,
    alive_pid: Option<u32>,
}

impl FakePidRepo {
    fn empty() -> Self {
        Self { record: Mutex::new(None), alive_pid: None }
    }

    fn with_stale_record(record: PidRecord) -> Self {
        Self { record: Mutex::new(Some(record)), alive_pid: None }
    }

    fn with_live_record(record: PidRecord) -> Self {
        let pid = record.pid;
        Self { record: Mutex::new(Some(record)), alive_pid: Some(pid) }
    }
}

#[async_trait]
impl PidRepositoryPort for FakePidRepo {
    async fn load(&self) -> Result<Option<PidRecord>, DomainError> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn save(&self, record: &PidRecord) -> Result<(), DomainError> {
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<(), DomainError> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }

    fn process_is_alive(&self, pid: u32) -> bool {
        self.alive_pid == Some(pid)
    }
}

fn original_list() -> OriginalResolvers {
    OriginalResolvers::List(vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()])
}

#[tokio::test]
async fn configure_then_restore_round_trips_to_the_exact_original_resolvers() {
    let configurator = Arc::new(FakeConfigurator::new(original_list()));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());

    let toggle = ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe.clone(),
        state_repo.clone(),
        backup_repo.clone(),
    );

    toggle.execute(true).await.expect("enable should succeed");
    assert_eq!(
        *configurator.current_resolvers.lock().unwrap(),
        OriginalResolvers::List(vec!["127.0.0.1".to_string(), "8.8.8.8".to_string()])
    );

    toggle.execute(false).await.expect("disable should succeed");
    assert_eq!(*configurator.current_resolvers.lock().unwrap(), original_list());
}

#[tokio::test]
async fn startup_resumes_blocking_from_persisted_intent() {
    let configurator = Arc::new(FakeConfigurator::new(original_list()));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());

    // A crash can leave this on disk without the OS ever having been
    // re-pointed at the proxy; `execute(true)` alone would treat it as a
    // no-op since the persisted state already says "blocking".
    state_repo
        .save(&DaemonState::new(true, "0.1.0"))
        .await
        .unwrap();

    let toggle = Arc::new(ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe,
        state_repo.clone(),
        backup_repo,
    ));
    let pid_repo = Arc::new(FakePidRepo::empty());
    let probe = Arc::new(FakeProbe::new(true));

    let lifecycle = LifecycleManager::new(pid_repo, state_repo, configurator.clone(), proxy, probe, toggle);

    lifecycle.startup().await.expect("startup should resume blocking");
    assert_eq!(configurator.applied.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn toggle_is_idempotent() {
    let configurator = Arc::new(FakeConfigurator::new(original_list()));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());

    let toggle = ToggleBlockingUseCase::new(configurator.clone(), proxy, probe, state_repo, backup_repo);

    toggle.execute(true).await.unwrap();
    let second = toggle.execute(true).await;
    assert!(matches!(second, Err(LifecycleError::NoOp("enabled"))));
    assert_eq!(configurator.applied.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn single_instance_is_enforced_against_a_live_pid() {
    let configurator = Arc::new(FakeConfigurator::new(original_list()));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());
    let toggle = Arc::new(ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe.clone(),
        state_repo.clone(),
        backup_repo.clone(),
    ));

    let existing = PidRecord {
        pid: 999_999,
        start_time: chrono::Utc::now(),
        platform: Platform::current(),
    };
    let pid_repo = Arc::new(FakePidRepo::with_live_record(existing));

    let lifecycle = LifecycleManager::new(pid_repo, state_repo, configurator, proxy, probe, toggle);

    let result = lifecycle.startup().await;
    assert!(matches!(result, Err(LifecycleError::AlreadyRunning(999_999))));
}

#[tokio::test]
async fn stale_pid_file_does_not_block_startup() {
    let configurator = Arc::new(FakeConfigurator::new(original_list()));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());
    let toggle = Arc::new(ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe.clone(),
        state_repo.clone(),
        backup_repo.clone(),
    ));

    let stale = PidRecord {
        pid: 888_888,
        start_time: chrono::Utc::now(),
        platform: Platform::current(),
    };
    let pid_repo = Arc::new(FakePidRepo::with_stale_record(stale));

    let lifecycle = LifecycleManager::new(pid_repo, state_repo, configurator, proxy.clone(), probe, toggle);

    lifecycle.startup().await.expect("stale pid should not block startup");
    assert!(proxy.is_bound());
}

#[tokio::test]
async fn poisoned_live_resolvers_are_restored_and_verified_on_startup() {
    // The OS is still pointed at the loopback proxy from a run that
    // crashed before it could restore on exit — detected by reading the
    // *live* resolver config, independent of whatever the backup file
    // says.
    let configurator = Arc::new(FakeConfigurator::new(OriginalResolvers::List(vec![
        "127.0.0.1".to_string(),
    ])));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(true));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());

    let toggle = Arc::new(ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe.clone(),
        state_repo.clone(),
        backup_repo,
    ));
    let pid_repo = Arc::new(FakePidRepo::empty());

    let lifecycle = LifecycleManager::new(pid_repo, state_repo, configurator.clone(), proxy, probe, toggle);

    lifecycle
        .startup()
        .await
        .expect("startup should recover from poisoned live resolvers");
    assert!(configurator.restored.load(Ordering::SeqCst));
}

#[tokio::test]
async fn poisoned_live_resolvers_recovery_fails_closed_when_external_resolution_is_still_broken() {
    let configurator = Arc::new(FakeConfigurator::new(OriginalResolvers::List(vec![
        "127.0.0.1".to_string(),
    ])));
    let proxy = Arc::new(FakeProxy::new());
    let probe = Arc::new(FakeProbe::new(false));
    let state_repo = Arc::new(FakeStateRepo::default());
    let backup_repo = Arc::new(FakeBackupRepo::default());

    let toggle = Arc::new(ToggleBlockingUseCase::new(
        configurator.clone(),
        proxy.clone(),
        probe.clone(),
        state_repo.clone(),
        backup_repo,
    ));
    let pid_repo = Arc::new(FakePidRepo::empty());

    let lifecycle = LifecycleManager::new(pid_repo, state_repo, configurator, proxy, probe, toggle);

    let result = lifecycle.startup().await;
    assert!(matches!(result, Err(LifecycleError::DnsIntegrityFailed { .. })));
}
