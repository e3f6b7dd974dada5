use super::atomic_file::write_atomic;
use async_trait::async_trait;
use sentinel_dns_application::ports::DaemonStateRepositoryPort;
use sentinel_dns_domain::{DaemonState, DomainError};
use std::path::PathBuf;

pub struct FileDaemonStateRepository {
    path: PathBuf,
}

impl FileDaemonStateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DaemonStateRepositoryPort for FileDaemonStateRepository {
    async fn load(&self) -> Result<Option<DaemonState>, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let state = serde_json::from_slice(&bytes)
                    .map_err(|e| DomainError::Config(format!("corrupt state file: {e}")))?;
                Ok(Some(state))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DomainError::from(err)),
        }
    }

    async fn save(&self, state: &DaemonState) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| DomainError::Config(format!("failed to serialize daemon state: {e}")))?;
        write_atomic(&self.path, bytes).await.map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileDaemonStateRepository::new(dir.path().join("state.json"));
        assert!(repo.load().await.unwrap().is_none());

        let state = DaemonState::new(true, "0.1.0");
        repo.save(&state).await.unwrap();
        let loaded = repo.load().await.unwrap().unwrap();
        assert!(loaded.is_blocking);
    }
}
