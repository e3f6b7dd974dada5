use super::atomic_file::write_atomic;
use async_trait::async_trait;
use sentinel_dns_application::ports::PidRepositoryPort;
use sentinel_dns_domain::{DomainError, PidRecord};
use std::path::PathBuf;

pub struct FilePidRepository {
    path: PathBuf,
}

impl FilePidRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PidRepositoryPort for FilePidRepository {
    async fn load(&self) -> Result<Option<PidRecord>, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| DomainError::Config(format!("corrupt pid file: {e}")))?;
                Ok(Some(record))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DomainError::from(err)),
        }
    }

    async fn save(&self, record: &PidRecord) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| DomainError::Config(format!("failed to serialize pid record: {e}")))?;
        write_atomic(&self.path, bytes).await.map_err(DomainError::from)
    }

    async fn remove(&self) -> Result<(), DomainError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DomainError::from(err)),
        }
    }

    fn process_is_alive(&self, pid: u32) -> bool {
        #[cfg(unix)]
        {
            // SAFETY: signal 0 performs no action beyond existence/permission
            // checks; `pid` is a plain integer with no aliasing concerns.
            unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
        }
        #[cfg(not(unix))]
        {
            // Best-effort: treat unknown platforms as "process gone" rather
            // than refusing to start.
            let _ = pid;
            false
        }
    }
}
