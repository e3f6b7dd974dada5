use async_trait::async_trait;
use sentinel_dns_domain::DnsBackup;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfiguratorError {
    #[error("permission denied performing {operation}: {source}")]
    PermissionDenied {
        operation: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no active network interface could be detected")]
    NoInterfaceDetected,
    #[error("proxy is not answering on its configured port; refusing to configure DNS")]
    ProxyNotAnswering,
    #[error("subprocess call timed out after {0:?}")]
    SubprocessTimeout(std::time::Duration),
    #[error("platform command failed: {0}")]
    CommandFailed(String),
    #[error("restore failed: {0}")]
    RestoreFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform-abstracted system DNS configuration, implemented once per
/// target OS in the infrastructure layer.
///
/// At most one `configure`/`restore` call may be in flight at a time —
/// callers are responsible for serializing access (the Lifecycle Manager
/// holds a single-writer lock around both).
#[async_trait]
pub trait DnsConfiguratorPort: Send + Sync {
    /// Auto-detects the interface/service this backend will manage.
    async fn detect_interface(&self) -> Result<String, ConfiguratorError>;

    /// Reads the resolvers currently configured on `interface`.
    async fn read_current_resolvers(
        &self,
        interface: &str,
    ) -> Result<sentinel_dns_domain::OriginalResolvers, ConfiguratorError>;

    /// Points `interface` at `primary` (normally the loopback proxy) with
    /// `secondary` installed as a fallback.
    async fn apply_resolvers(
        &self,
        interface: &str,
        primary: std::net::IpAddr,
        secondary: std::net::IpAddr,
    ) -> Result<(), ConfiguratorError>;

    /// Reapplies a previously captured resolver list.
    async fn apply_backup(
        &self,
        interface: &str,
        backup: &DnsBackup,
    ) -> Result<(), ConfiguratorError>;

    /// Returns the interface to fully automatic (DHCP-managed) resolution.
    async fn restore_automatic(&self, interface: &str) -> Result<(), ConfiguratorError>;
}
