use super::atomic_file::write_atomic;
use async_trait::async_trait;
use sentinel_dns_application::ports::DnsBackupRepositoryPort;
use sentinel_dns_domain::{DnsBackup, DomainError};
use std::path::PathBuf;

/// Never deleted implicitly (§3, `DnsBackup` invariant) — only overwritten
/// when a new non-poisoned value is observed, which callers enforce.
pub struct FileDnsBackupRepository {
    path: PathBuf,
}

impl FileDnsBackupRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DnsBackupRepositoryPort for FileDnsBackupRepository {
    async fn load(&self) -> Result<Option<DnsBackup>, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let backup = serde_json::from_slice(&bytes)
                    .map_err(|e| DomainError::Config(format!("corrupt dns backup file: {e}")))?;
                Ok(Some(backup))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DomainError::from(err)),
        }
    }

    async fn save(&self, backup: &DnsBackup) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec_pretty(backup)
            .map_err(|e| DomainError::Config(format!("failed to serialize dns backup: {e}")))?;
        write_atomic(&self.path, bytes).await.map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_dns_domain::{OriginalResolvers, Platform};

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileDnsBackupRepository::new(dir.path().join("backup.json"));
        let backup = DnsBackup {
            timestamp: chrono::Utc::now(),
            platform: Platform::current(),
            interface: "eth0".to_string(),
            original_resolvers: OriginalResolvers::List(vec!["192.168.1.1".to_string()]),
        };
        repo.save(&backup).await.unwrap();
        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.interface, "eth0");
    }
}
