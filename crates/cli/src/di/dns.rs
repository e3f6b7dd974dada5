use sentinel_dns_application::ports::{BlocklistStorePort, DnsConfiguratorPort, DnsProbePort, ProxyControlPort};
use sentinel_dns_domain::{Config, Statistics};
use sentinel_dns_infrastructure::dns::{DnsProxy, HickoryDnsProbe};
use sentinel_dns_infrastructure::system;
use std::net::SocketAddr;
use std::sync::Arc;

/// The DNS-facing adapters: the loopback proxy, its upstream probe, the
/// platform-specific system configurator, and the shared query counters.
pub struct DnsServices {
    pub configurator: Arc<dyn DnsConfiguratorPort>,
    pub proxy: Arc<dyn ProxyControlPort>,
    pub probe: Arc<dyn DnsProbePort>,
    pub statistics: Arc<Statistics>,
}

impl DnsServices {
    pub fn new(config: &Config, blocklist_store: Arc<dyn BlocklistStorePort>) -> anyhow::Result<Self> {
        let statistics = Arc::new(Statistics::new());

        let upstreams = config
            .dns
            .upstream_servers
            .iter()
            .map(|s| s.parse::<SocketAddr>())
            .collect::<Result<Vec<_>, _>>()?;

        let proxy: Arc<dyn ProxyControlPort> =
            Arc::new(DnsProxy::new(blocklist_store, statistics.clone(), upstreams));

        Ok(Self {
            configurator: system::detect_configurator(),
            proxy,
            probe: Arc::new(HickoryDnsProbe::new()),
            statistics,
        })
    }
}
