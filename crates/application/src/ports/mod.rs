pub mod blocklist_loader;
pub mod blocklist_store;
pub mod dns_configurator;
pub mod proxy_control;
pub mod state_store;

pub use blocklist_loader::{BlocklistLoaderPort, LoadReport};
pub use blocklist_store::BlocklistStorePort;
pub use dns_configurator::{ConfiguratorError, DnsConfiguratorPort};
pub use proxy_control::{DnsProbePort, ProxyControlPort, ProxyError};
pub use state_store::{DaemonStateRepositoryPort, DnsBackupRepositoryPort, PidRepositoryPort};
