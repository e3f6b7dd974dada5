use super::{require_success, run};
use async_trait::async_trait;
use sentinel_dns_application::ports::{ConfiguratorError, DnsConfiguratorPort};
use sentinel_dns_domain::{DnsBackup, OriginalResolvers};
use std::net::IpAddr;
use tracing::info;

const EMPTY_SENTINEL: &str = "Empty";

/// macOS backend driven entirely through `networksetup`, preferring the
/// Wi-Fi service, then Ethernet, then whatever is listed first.
pub struct MacosConfigurator;

impl MacosConfigurator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacosConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsConfiguratorPort for MacosConfigurator {
    async fn detect_interface(&self) -> Result<String, ConfiguratorError> {
        let output = run("networksetup", &["-listallnetworkservices"]).await?;
        require_success(&output, "networksetup -listallnetworkservices")?;
        let text = String::from_utf8_lossy(&output.stdout);
        let services: Vec<&str> = text
            .lines()
            .skip(1)
            .filter(|l| !l.starts_with('*'))
            .collect();

        let preferred = services
            .iter()
            .find(|s| s.to_ascii_lowercase().contains("wi-fi"))
            .or_else(|| services.iter().find(|s| s.to_ascii_lowercase().contains("ethernet")))
            .or_else(|| services.first());

        preferred
            .map(|s| s.trim().to_string())
            .ok_or(ConfiguratorError::NoInterfaceDetected)
    }

    async fn read_current_resolvers(
        &self,
        interface: &str,
    ) -> Result<OriginalResolvers, ConfiguratorError> {
        let output = run("networksetup", &["-getdnsservers", interface]).await?;
        require_success(&output, "networksetup -getdnsservers")?;
        let text = String::from_utf8_lossy(&output.stdout);
        let trimmed = text.trim();

        if trimmed.to_ascii_lowercase().contains("any") || trimmed.is_empty() {
            return Ok(OriginalResolvers::dhcp());
        }
        let ips: Vec<String> = trimmed
            .lines()
            .filter(|l| l.parse::<IpAddr>().is_ok())
            .map(|l| l.to_string())
            .collect();
        if ips.is_empty() {
            Ok(OriginalResolvers::dhcp())
        } else {
            Ok(OriginalResolvers::List(ips))
        }
    }

    async fn apply_resolvers(
        &self,
        interface: &str,
        primary: IpAddr,
        secondary: IpAddr,
    ) -> Result<(), ConfiguratorError> {
        info!(interface, %primary, %secondary, "applying resolvers via networksetup");
        let output = run(
            "networksetup",
            &[
                "-setdnsservers",
                interface,
                &primary.to_string(),
                &secondary.to_string(),
            ],
        )
        .await?;
        require_success(&output, "networksetup -setdnsservers")
    }

    async fn apply_backup(
        &self,
        interface: &str,
        backup: &DnsBackup,
    ) -> Result<(), ConfiguratorError> {
        match &backup.original_resolvers {
            OriginalResolvers::List(ips) => {
                let mut args = vec!["-setdnsservers", interface];
                args.extend(ips.iter().map(|s| s.as_str()));
                let output = run("networksetup", &args).await?;
                require_success(&output, "networksetup -setdnsservers")
            }
            OriginalResolvers::Dhcp(_) | OriginalResolvers::RawFile(_) => {
                self.restore_automatic(interface).await
            }
        }
    }

    async fn restore_automatic(&self, interface: &str) -> Result<(), ConfiguratorError> {
        let output = run("networksetup", &["-setdnsservers", interface, EMPTY_SENTINEL]).await?;
        require_success(&output, "networksetup -setdnsservers (empty)")
    }
}
