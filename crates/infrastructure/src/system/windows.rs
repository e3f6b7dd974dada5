use super::{require_success, run};
use async_trait::async_trait;
use sentinel_dns_application::ports::{ConfiguratorError, DnsConfiguratorPort};
use sentinel_dns_domain::{DnsBackup, OriginalResolvers};
use std::net::IpAddr;
use tracing::info;

/// Windows backend driven through `netsh interface ip`. Interface
/// selection picks the first adapter reported as "Connected".
pub struct WindowsConfigurator;

impl WindowsConfigurator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsConfiguratorPort for WindowsConfigurator {
    async fn detect_interface(&self) -> Result<String, ConfiguratorError> {
        let output = run("netsh", &["interface", "show", "interface"]).await?;
        require_success(&output, "netsh interface show interface")?;
        let text = String::from_utf8_lossy(&output.stdout);
        for line in text.lines() {
            if line.contains("Connected") {
                if let Some(name) = line.split_whitespace().last() {
                    return Ok(name.to_string());
                }
            }
        }
        Err(ConfiguratorError::NoInterfaceDetected)
    }

    async fn read_current_resolvers(
        &self,
        interface: &str,
    ) -> Result<OriginalResolvers, ConfiguratorError> {
        let output = run(
            "netsh",
            &["interface", "ip", "show", "dns", &format!("name=\"{interface}\"")],
        )
        .await?;
        require_success(&output, "netsh interface ip show dns")?;
        let text = String::from_utf8_lossy(&output.stdout);

        if text.to_ascii_lowercase().contains("dhcp") {
            return Ok(OriginalResolvers::dhcp());
        }
        let ips: Vec<String> = text
            .lines()
            .filter_map(|line| line.split(':').nth(1))
            .map(|s| s.trim())
            .filter(|s| s.parse::<IpAddr>().is_ok())
            .map(|s| s.to_string())
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
        info!(interface, %primary, %secondary, "applying resolvers via netsh");
        let set = run(
            "netsh",
            &[
                "interface",
                "ip",
                "set",
                "dns",
                &format!("name=\"{interface}\""),
                "static",
                &primary.to_string(),
            ],
        )
        .await?;
        require_success(&set, "netsh interface ip set dns")?;

        let add = run(
            "netsh",
            &[
                "interface",
                "ip",
                "add",
                "dns",
                &format!("name=\"{interface}\""),
                &secondary.to_string(),
                "index=2",
            ],
        )
        .await?;
        require_success(&add, "netsh interface ip add dns")
    }

    async fn apply_backup(
        &self,
        interface: &str,
        backup: &DnsBackup,
    ) -> Result<(), ConfiguratorError> {
        match &backup.original_resolvers {
            OriginalResolvers::List(ips) => {
                let Some((primary, rest)) = ips.split_first() else {
                    return self.restore_automatic(interface).await;
                };
                let set = run(
                    "netsh",
                    &[
                        "interface",
                        "ip",
                        "set",
                        "dns",
                        &format!("name=\"{interface}\""),
                        "static",
                        primary,
                    ],
                )
                .await?;
                require_success(&set, "netsh interface ip set dns")?;
                for (i, ip) in rest.iter().enumerate() {
                    let index = (i + 2).to_string();
                    let add = run(
                        "netsh",
                        &[
                            "interface",
                            "ip",
                            "add",
                            "dns",
                            &format!("name=\"{interface}\""),
                            ip,
                            &format!("index={index}"),
                        ],
                    )
                    .await?;
                    require_success(&add, "netsh interface ip add dns")?;
                }
                Ok(())
            }
            OriginalResolvers::Dhcp(_) | OriginalResolvers::RawFile(_) => {
                self.restore_automatic(interface).await
            }
        }
    }

    async fn restore_automatic(&self, interface: &str) -> Result<(), ConfiguratorError> {
        let output = run(
            "netsh",
            &["interface", "ip", "set", "dns", &format!("name=\"{interface}\""), "dhcp"],
        )
        .await?;
        require_success(&output, "netsh interface ip set dns dhcp")
    }
}
