use async_trait::async_trait;
use sentinel_dns_application::ports::{BlocklistLoaderPort, LoadReport};
use sentinel_dns_domain::{Blocklist, Domain, DomainError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

const MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Small hardcoded seed set used when the configured blocklist file is
/// missing, empty, or entirely rejected, so the proxy never starts with
/// zero protection (§4.1).
const EMERGENCY_FALLBACK: &[&str] = &[
    "pornhub.com",
    "xvideos.com",
    "xnxx.com",
    "xhamster.com",
    "redtube.com",
];

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Loads a `Blocklist` from a JSON file containing a top-level array of
/// domain-name strings.
pub struct FileBlocklistLoader;

impl FileBlocklistLoader {
    pub fn new() -> Self {
        Self
    }

    fn accept(raw: &str) -> Option<Domain> {
        let candidate = raw.trim().to_ascii_lowercase();
        if !candidate.contains('.') {
            return None;
        }
        Domain::parse(&candidate).ok()
    }

    fn emergency_fallback() -> (Blocklist, LoadReport) {
        let domains: HashSet<Domain> = EMERGENCY_FALLBACK
            .iter()
            .filter_map(|d| Domain::parse(d).ok())
            .collect();
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::SeqCst);
        (
            Blocklist::new(domains.clone(), generation),
            LoadReport {
                accepted: domains.len(),
                rejected: 0,
                used_emergency_fallback: true,
            },
        )
    }
}

impl Default for FileBlocklistLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlocklistLoaderPort for FileBlocklistLoader {
    async fn load(&self, path: &Path) -> Result<(Blocklist, LoadReport), DomainError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "blocklist file unreadable, using emergency fallback");
                return Ok(Self::emergency_fallback());
            }
        };
        if metadata.len() > MAX_FILE_BYTES {
            warn!(
                path = %path.display(),
                bytes = metadata.len(),
                "blocklist file exceeds the size limit, using emergency fallback"
            );
            return Ok(Self::emergency_fallback());
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(DomainError::from)?;
        let entries: Vec<String> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "blocklist is not a JSON array of strings, using emergency fallback"
                );
                return Ok(Self::emergency_fallback());
            }
        };

        let mut domains: HashSet<Domain> = HashSet::with_capacity(entries.len());
        let mut rejected = 0usize;
        for entry in &entries {
            match Self::accept(entry) {
                Some(domain) => {
                    domains.insert(domain);
                }
                None => rejected += 1,
            }
        }

        if domains.is_empty() {
            warn!(
                path = %path.display(),
                rejected,
                "blocklist parsed to zero accepted entries, using emergency fallback"
            );
            return Ok(Self::emergency_fallback());
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::SeqCst);
        let accepted = domains.len();
        info!(accepted, rejected, generation, "loaded blocklist file");
        Ok((
            Blocklist::new(domains, generation),
            LoadReport {
                accepted,
                rejected,
                used_emergency_fallback: false,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn accepts_valid_rejects_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["example.com", "BAD..DOUBLE.com", "nodothere", "Sub.Example.com."]"#).unwrap();

        let (list, report) = FileBlocklistLoader::new().load(file.path()).await.unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 2);
        assert!(!report.used_emergency_fallback);
        assert!(list.contains("example.com"));
        assert!(list.contains("sub.example.com"));
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_emergency_list() {
        let (list, report) = FileBlocklistLoader::new()
            .load(Path::new("/nonexistent/path/blocklist.json"))
            .await
            .unwrap();
        assert!(report.used_emergency_fallback);
        assert!(!list.is_empty());
    }

    #[tokio::test]
    async fn all_rejected_falls_back_to_emergency_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["nodot", ".."]"#).unwrap();

        let (_, report) = FileBlocklistLoader::new().load(file.path()).await.unwrap();
        assert!(report.used_emergency_fallback);
    }

    #[tokio::test]
    async fn malformed_json_falls_back_to_emergency_list_instead_of_erroring() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();

        let (list, report) = FileBlocklistLoader::new().load(file.path()).await.unwrap();
        assert!(report.used_emergency_fallback);
        assert!(!list.is_empty());
    }

    #[tokio::test]
    async fn oversized_file_falls_back_to_emergency_list_instead_of_erroring() {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_FILE_BYTES + 1).unwrap();

        let (list, report) = FileBlocklistLoader::new().load(file.path()).await.unwrap();
        assert!(report.used_emergency_fallback);
        assert!(!list.is_empty());
    }
}
