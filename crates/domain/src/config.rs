//! Configuration for the daemon: a TOML file plus CLI overrides, following
//! the teacher's `Config`/`CliOverrides` split.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsProxyConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_preferred_port")]
    pub preferred_port: u16,

    #[serde(default = "default_fallback_port")]
    pub fallback_port: u16,

    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    #[serde(default = "default_forward_timeout_secs")]
    pub forward_timeout_secs: u64,

    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

impl Default for DnsProxyConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            preferred_port: default_preferred_port(),
            fallback_port: default_fallback_port(),
            upstream_servers: default_upstream_servers(),
            forward_timeout_secs: default_forward_timeout_secs(),
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}
fn default_preferred_port() -> u16 {
    53
}
fn default_fallback_port() -> u16 {
    5353
}
fn default_upstream_servers() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "8.8.4.4:53".to_string()]
}
fn default_forward_timeout_secs() -> u64 {
    5
}
fn default_health_check_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockingConfig {
    #[serde(default = "default_blocklist_path")]
    pub blocklist_path: PathBuf,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            blocklist_path: default_blocklist_path(),
        }
    }
}

fn default_blocklist_path() -> PathBuf {
    PathBuf::from("/etc/sentinel-dns/blocklist.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStoreConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,
    #[serde(default = "default_pid_path")]
    pub pid_path: PathBuf,
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            backup_path: default_backup_path(),
            pid_path: default_pid_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("/var/lib/sentinel-dns/state.json")
}
fn default_backup_path() -> PathBuf {
    PathBuf::from("/var/lib/sentinel-dns/dns-backup.json")
}
fn default_pid_path() -> PathBuf {
    PathBuf::from("/var/run/sentinel-dns.pid")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlApiConfig {
    #[serde(default = "default_control_bind")]
    pub bind_address: String,
    #[serde(default = "default_control_port")]
    pub port: u16,
}

impl Default for ControlApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_control_bind(),
            port: default_control_port(),
        }
    }
}

fn default_control_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_control_port() -> u16 {
    8531
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dns: DnsProxyConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub state: StateStoreConfig,
    #[serde(default)]
    pub control: ControlApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dry_run: bool,
}

/// CLI flags that override whatever was loaded from the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub blocklist_path: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Loads a TOML config file if `path` is given and exists, falling
    /// back to defaults, then applies CLI overrides on top.
    pub fn load(path: Option<&std::path::Path>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let text =
                    std::fs::read_to_string(p).map_err(|e| ConfigError::Read {
                        path: p.to_path_buf(),
                        source: e,
                    })?;
                toml::from_str(&text).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    source: Box::new(e),
                })?
            }
            _ => Config::default(),
        };

        if let Some(blocklist_path) = overrides.blocklist_path {
            config.blocking.blocklist_path = blocklist_path;
        }
        if let Some(dry_run) = overrides.dry_run {
            config.dry_run = dry_run;
        }

        Ok(config)
    }

    /// Rejects configurations that would make the daemon unsafe to run:
    /// a proxy listening outside loopback, or preferred/fallback ports equal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.listen_address != "127.0.0.1" && self.dns.listen_address != "::1" {
            return Err(ConfigError::Invalid(format!(
                "dns.listen_address must be loopback, got {}",
                self.dns.listen_address
            )));
        }
        if self.dns.preferred_port == self.dns.fallback_port {
            return Err(ConfigError::Invalid(
                "dns.preferred_port and dns.fallback_port must differ".into(),
            ));
        }
        if self.dns.upstream_servers.is_empty() {
            return Err(ConfigError::Invalid(
                "dns.upstream_servers must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.dns.preferred_port, 53);
        assert_eq!(config.dns.fallback_port, 5353);
        assert_eq!(config.dns.upstream_servers.len(), 2);
    }

    #[test]
    fn cli_overrides_apply_on_top_of_defaults() {
        let overrides = CliOverrides {
            blocklist_path: Some(PathBuf::from("/tmp/custom.json")),
            dry_run: Some(true),
        };
        let config = Config::load(None, overrides).unwrap();
        assert_eq!(config.blocking.blocklist_path, PathBuf::from("/tmp/custom.json"));
        assert!(config.dry_run);
    }

    #[test]
    fn validate_rejects_non_loopback_listen_address() {
        let mut config = Config::default();
        config.dns.listen_address = "0.0.0.0".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }
}
