use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target platform a `DnsBackup`/`PidRecord` was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win32,
    Darwin,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }
}

/// The pre-modification resolver state for a managed interface, either a
/// concrete list of resolver IP literals, the DHCP sentinel, or (on the
/// Linux config-file backend) a verbatim copy of the resolver config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginalResolvers {
    List(Vec<String>),
    Dhcp(DhcpSentinel),
    RawFile(String),
}

/// Newtype so the `"dhcp"` sentinel round-trips through JSON as the exact
/// string rather than colliding with `RawFile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhcpSentinel;

impl Serialize for DhcpSentinel {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str("dhcp")
    }
}

impl<'de> Deserialize<'de> for DhcpSentinel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        if s == "dhcp" {
            Ok(DhcpSentinel)
        } else {
            Err(serde::de::Error::custom("expected \"dhcp\""))
        }
    }
}

impl OriginalResolvers {
    pub fn dhcp() -> Self {
        OriginalResolvers::Dhcp(DhcpSentinel)
    }

    pub fn is_dhcp(&self) -> bool {
        matches!(self, OriginalResolvers::Dhcp(_))
    }

    /// A backup is poisoned if it records the loopback proxy as the
    /// "original" resolver — that can only happen if a previous run
    /// crashed mid-reconfiguration before it restored DNS.
    pub fn is_poisoned(&self) -> bool {
        match self {
            OriginalResolvers::List(ips) => ips.iter().any(|ip| is_loopback_literal(ip)),
            OriginalResolvers::RawFile(contents) => contents
                .lines()
                .any(|line| line.split_whitespace().any(is_loopback_literal)),
            OriginalResolvers::Dhcp(_) => false,
        }
    }
}

fn is_loopback_literal(s: &str) -> bool {
    if s.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match s.parse::<std::net::IpAddr>() {
        Ok(std::net::IpAddr::V4(v4)) => v4.octets()[0] == 127,
        Ok(std::net::IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => false,
    }
}

/// Persisted record of the pre-modification resolver state for one
/// managed interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsBackup {
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    pub interface: String,
    #[serde(rename = "originalDNS")]
    pub original_resolvers: OriginalResolvers,
}

/// Reflects the last intentional user choice about whether blocking
/// should be active; written on toggle and on graceful shutdown, read on
/// startup to restore intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonState {
    pub is_blocking: bool,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl DaemonState {
    pub fn new(is_blocking: bool, version: impl Into<String>) -> Self {
        Self {
            is_blocking,
            timestamp: Utc::now(),
            version: version.into(),
        }
    }
}

/// Enforces single-instance and lets a fresh start detect and clean up a
/// stale PID file left behind by a crashed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidRecord {
    pub pid: u32,
    pub start_time: DateTime<Utc>,
    pub platform: Platform,
}

impl PidRecord {
    pub fn for_current_process() -> Self {
        Self {
            pid: std::process::id(),
            start_time: Utc::now(),
            platform: Platform::current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dhcp_sentinel_round_trips() {
        let backup = DnsBackup {
            timestamp: Utc::now(),
            platform: Platform::Linux,
            interface: "eth0".to_string(),
            original_resolvers: OriginalResolvers::dhcp(),
        };
        let json = serde_json::to_string(&backup).unwrap();
        assert!(json.contains("\"dhcp\""));
        let back: DnsBackup = serde_json::from_str(&json).unwrap();
        assert!(back.original_resolvers.is_dhcp());
    }

    #[test]
    fn loopback_backup_is_poisoned() {
        let poisoned = OriginalResolvers::List(vec!["127.0.0.1".to_string()]);
        assert!(poisoned.is_poisoned());

        let clean = OriginalResolvers::List(vec!["192.168.1.1".to_string()]);
        assert!(!clean.is_poisoned());
    }

    #[test]
    fn dhcp_sentinel_is_never_poisoned() {
        assert!(!OriginalResolvers::dhcp().is_poisoned());
    }
}
