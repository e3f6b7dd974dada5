use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use sentinel_dns_application::ports::DnsProbePort;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends a real A query to `server` and reports whether any well-formed
/// DNS reply came back, used both by the Configurator's pre-flight check
/// ("is the proxy actually answering before I point the host at it") and
/// the startup integrity check ("can I still resolve externally after a
/// restore"). A response code other than `NoError` (e.g. `NXDOMAIN`)
/// still counts as success — it proves a DNS server answered the query,
/// which is all either caller needs.
pub struct HickoryDnsProbe;

impl HickoryDnsProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HickoryDnsProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsProbePort for HickoryDnsProbe {
    async fn resolve_a(&self, name: &str, server: SocketAddr) -> bool {
        let Ok(parsed_name) = Name::from_str(name) else {
            return false;
        };

        let mut query = Query::new();
        query.set_name(parsed_name);
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let Ok(bytes) = message.to_bytes() else {
            return false;
        };

        let socket = match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => socket,
            Err(err) => {
                debug!(error = %err, "probe failed to open socket");
                return false;
            }
        };

        if socket.send_to(&bytes, server).await.is_err() {
            return false;
        }

        let mut buf = [0u8; 512];
        match tokio::time::timeout(PROBE_TIMEOUT, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => Message::from_vec(&buf[..len]).is_ok(),
            _ => false,
        }
    }
}
