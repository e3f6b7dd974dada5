use super::{require_success, run};
use async_trait::async_trait;
use sentinel_dns_application::ports::{ConfiguratorError, DnsConfiguratorPort};
use sentinel_dns_domain::DnsBackup;
use sentinel_dns_domain::OriginalResolvers;
use std::net::IpAddr;
use tracing::{info, warn};

const RESOLVED_DROPIN_DIR: &str = "/etc/systemd/resolved.conf.d";
const RESOLVED_DROPIN: &str = "/etc/systemd/resolved.conf.d/99-sentinel-dns.conf";
const RESOLV_CONF: &str = "/etc/resolv.conf";
const MARKER_BEGIN: &str = "# BEGIN sentinel-dns managed block";
const MARKER_END: &str = "# END sentinel-dns managed block";

/// Linux backend: prefers `systemd-resolved` via a drop-in config and
/// `resolvectl`, falling back to editing `/etc/resolv.conf` between
/// well-known marker comments when `systemd-resolved` is not in use.
pub struct LinuxConfigurator;

impl LinuxConfigurator {
    pub fn new() -> Self {
        Self
    }

    async fn resolved_is_active(&self) -> bool {
        run("systemctl", &["is-active", "systemd-resolved"])
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn write_dropin(&self, primary: IpAddr, secondary: IpAddr) -> Result<(), ConfiguratorError> {
        tokio::fs::create_dir_all(RESOLVED_DROPIN_DIR)
            .await
            .map_err(ConfiguratorError::Io)?;
        let contents = format!("[Resolve]\nDNS={primary} {secondary}\n");
        tokio::fs::write(RESOLVED_DROPIN, contents)
            .await
            .map_err(ConfiguratorError::Io)?;
        let output = run("systemctl", &["restart", "systemd-resolved"]).await?;
        require_success(&output, "systemctl restart systemd-resolved")
    }

    async fn remove_dropin_and_restart(&self) -> Result<(), ConfiguratorError> {
        let _ = tokio::fs::remove_file(RESOLVED_DROPIN).await;
        if self.resolved_is_active().await {
            let output = run("systemctl", &["restart", "systemd-resolved"]).await?;
            require_success(&output, "systemctl restart systemd-resolved")?;
        }
        Ok(())
    }

    async fn write_resolv_conf_block(&self, nameservers: &[String]) -> Result<(), ConfiguratorError> {
        let existing = tokio::fs::read_to_string(RESOLV_CONF)
            .await
            .unwrap_or_default();
        let without_block = strip_marker_block(&existing);
        let mut block = String::new();
        block.push_str(MARKER_BEGIN);
        block.push('\n');
        for ns in nameservers {
            block.push_str(&format!("nameserver {ns}\n"));
        }
        block.push_str(MARKER_END);
        block.push('\n');
        let new_contents = format!("{block}{without_block}");
        tokio::fs::write(RESOLV_CONF, new_contents)
            .await
            .map_err(ConfiguratorError::Io)
    }
}

impl Default for LinuxConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_marker_block(contents: &str) -> String {
    let mut out = String::new();
    let mut inside = false;
    for line in contents.lines() {
        if line.trim() == MARKER_BEGIN {
            inside = true;
            continue;
        }
        if line.trim() == MARKER_END {
            inside = false;
            continue;
        }
        if !inside {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[async_trait]
impl DnsConfiguratorPort for LinuxConfigurator {
    async fn detect_interface(&self) -> Result<String, ConfiguratorError> {
        let output = run("ip", &["route", "show", "default"]).await?;
        require_success(&output, "ip route show default")?;
        let text = String::from_utf8_lossy(&output.stdout);
        text.split_whitespace()
            .collect::<Vec<_>>()
            .windows(2)
            .find(|w| w[0] == "dev")
            .map(|w| w[1].to_string())
            .ok_or(ConfiguratorError::NoInterfaceDetected)
    }

    async fn read_current_resolvers(
        &self,
        interface: &str,
    ) -> Result<OriginalResolvers, ConfiguratorError> {
        if self.resolved_is_active().await {
            if let Ok(output) = run("resolvectl", &["dns", interface]).await {
                if output.status.success() {
                    let text = String::from_utf8_lossy(&output.stdout);
                    if let Some(ips) = parse_resolvectl_dns(&text) {
                        return Ok(OriginalResolvers::List(ips));
                    }
                }
            }
        }
        let contents = tokio::fs::read_to_string(RESOLV_CONF)
            .await
            .map_err(ConfiguratorError::Io)?;
        Ok(OriginalResolvers::RawFile(contents))
    }

    async fn apply_resolvers(
        &self,
        interface: &str,
        primary: IpAddr,
        secondary: IpAddr,
    ) -> Result<(), ConfiguratorError> {
        if self.resolved_is_active().await {
            info!(interface, %primary, %secondary, "applying resolvers via systemd-resolved drop-in");
            return self.write_dropin(primary, secondary).await;
        }
        warn!("systemd-resolved not active, falling back to /etc/resolv.conf edit");
        self.write_resolv_conf_block(&[primary.to_string(), secondary.to_string()])
            .await
    }

    async fn apply_backup(
        &self,
        _interface: &str,
        backup: &DnsBackup,
    ) -> Result<(), ConfiguratorError> {
        match &backup.original_resolvers {
            OriginalResolvers::List(ips) => {
                self.remove_dropin_and_restart().await?;
                self.write_resolv_conf_block(ips).await
            }
            OriginalResolvers::RawFile(contents) => {
                self.remove_dropin_and_restart().await?;
                tokio::fs::write(RESOLV_CONF, contents)
                    .await
                    .map_err(ConfiguratorError::Io)
            }
            OriginalResolvers::Dhcp(_) => self.restore_automatic(_interface).await,
        }
    }

    async fn restore_automatic(&self, _interface: &str) -> Result<(), ConfiguratorError> {
        self.remove_dropin_and_restart().await
    }
}

fn parse_resolvectl_dns(text: &str) -> Option<Vec<String>> {
    let (_, after_colon) = text.split_once(':')?;
    let ips: Vec<String> = after_colon
        .split_whitespace()
        .filter(|s| s.parse::<IpAddr>().is_ok())
        .map(|s| s.to_string())
        .collect();
    if ips.is_empty() {
        None
    } else {
        Some(ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolvectl_output() {
        let text = "Link 2 (eth0): 1.1.1.1 8.8.8.8\n";
        assert_eq!(
            parse_resolvectl_dns(text),
            Some(vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()])
        );
    }

    #[test]
    fn strips_existing_marker_block() {
        let contents = format!("nameserver 1.1.1.1\n{MARKER_BEGIN}\nnameserver 127.0.0.1\n{MARKER_END}\nsearch example.com\n");
        let stripped = strip_marker_block(&contents);
        assert!(!stripped.contains("127.0.0.1"));
        assert!(stripped.contains("search example.com"));
    }
}
