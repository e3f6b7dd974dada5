use async_trait::async_trait;
use sentinel_dns_domain::{DaemonState, DnsBackup, DomainError, PidRecord};

/// Persists the daemon's last-known-good blocking intent.
#[async_trait]
pub trait DaemonStateRepositoryPort: Send + Sync {
    async fn load(&self) -> Result<Option<DaemonState>, DomainError>;
    async fn save(&self, state: &DaemonState) -> Result<(), DomainError>;
}

/// Persists the pre-modification resolver backup. Never implicitly
/// deleted — only overwritten when a new non-poisoned value is observed.
#[async_trait]
pub trait DnsBackupRepositoryPort: Send + Sync {
    async fn load(&self) -> Result<Option<DnsBackup>, DomainError>;
    async fn save(&self, backup: &DnsBackup) -> Result<(), DomainError>;
}

/// Enforces single-instance and lets a fresh start detect a stale PID
/// file left behind by a crashed process.
#[async_trait]
pub trait PidRepositoryPort: Send + Sync {
    async fn load(&self) -> Result<Option<PidRecord>, DomainError>;
    async fn save(&self, record: &PidRecord) -> Result<(), DomainError>;
    async fn remove(&self) -> Result<(), DomainError>;
    /// `true` if a process with this PID is currently running.
    fn process_is_alive(&self, pid: u32) -> bool;
}
