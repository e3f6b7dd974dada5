use crate::dns::{forwarding, guard, sinkhole};
use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use sentinel_dns_application::ports::{ProxyControlPort, ProxyError};
use sentinel_dns_application::ports::BlocklistStorePort;
use sentinel_dns_domain::Statistics;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const PREFERRED_PORT: u16 = 53;
const FALLBACK_PORT: u16 = 5353;
const BIND_TIMEOUT: Duration = Duration::from_secs(5);
const RECV_BUFFER_BYTES: usize = 65535;

struct Running {
    addr: SocketAddr,
    listener: Arc<UdpSocket>,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

/// UDP DNS Proxy (§4.2): binds the loopback listener, classifies each
/// query against the shared Blocklist Store, and either synthesizes a
/// sinkhole answer or relays the query upstream.
pub struct DnsProxy {
    blocklist: Arc<dyn BlocklistStorePort>,
    statistics: Arc<Statistics>,
    upstreams: Vec<SocketAddr>,
    running: Mutex<Option<Running>>,
}

impl DnsProxy {
    pub fn new(
        blocklist: Arc<dyn BlocklistStorePort>,
        statistics: Arc<Statistics>,
        upstreams: Vec<SocketAddr>,
    ) -> Self {
        Self {
            blocklist,
            statistics,
            upstreams,
            running: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ProxyControlPort for DnsProxy {
    async fn start(&self) -> Result<SocketAddr, ProxyError> {
        let mut guard = self.running.lock().await;
        if let Some(running) = guard.as_ref() {
            return Ok(running.addr);
        }

        let socket = tokio::time::timeout(BIND_TIMEOUT, bind_listener())
            .await
            .map_err(|_| ProxyError::BindTimeout)?
            .map_err(ProxyError::BindFailed)?;
        let addr = socket.local_addr().map_err(ProxyError::BindFailed)?;
        let listener = Arc::new(socket);

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            listener.clone(),
            self.blocklist.clone(),
            self.statistics.clone(),
            self.upstreams.clone(),
            shutdown.clone(),
        ));

        info!(%addr, "DNS proxy listening");
        *guard = Some(Running {
            addr,
            listener,
            shutdown,
            task,
        });
        Ok(addr)
    }

    async fn stop(&self) {
        let mut guard = self.running.lock().await;
        if let Some(running) = guard.take() {
            running.shutdown.cancel();
            if let Err(err) = running.task.await {
                warn!(error = %err, "proxy receive loop task panicked during shutdown");
            }
            info!("DNS proxy stopped");
        }
    }

    fn bound_addr(&self) -> Option<SocketAddr> {
        self.running.try_lock().ok().and_then(|g| g.as_ref().map(|r| r.addr))
    }

    fn is_bound(&self) -> bool {
        self.bound_addr().is_some()
    }
}

/// Binds UDP on 127.0.0.1, preferring port 53 and falling back to 5353 if
/// it cannot be bound (permission denied or already in use).
async fn bind_listener() -> std::io::Result<UdpSocket> {
    match bind_with_buffers(SocketAddr::V4(SocketAddrV4::new(
        Ipv4Addr::LOCALHOST,
        PREFERRED_PORT,
    ))) {
        Ok(socket) => Ok(socket),
        Err(err) => {
            debug!(error = %err, port = PREFERRED_PORT, "falling back to secondary proxy port");
            bind_with_buffers(SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::LOCALHOST,
                FALLBACK_PORT,
            )))
        }
    }
}

fn bind_with_buffers(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_recv_buffer_size(8 * 1024 * 1024)?;
    socket.set_send_buffer_size(4 * 1024 * 1024)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

async fn run_loop(
    listener: Arc<UdpSocket>,
    blocklist: Arc<dyn BlocklistStorePort>,
    statistics: Arc<Statistics>,
    upstreams: Vec<SocketAddr>,
    shutdown: CancellationToken,
) {
    let mut buf = vec![0u8; RECV_BUFFER_BYTES];
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.recv_from(&mut buf) => {
                match result {
                    Ok((len, client_addr)) => {
                        statistics.record_seen();
                        let packet = buf[..len].to_vec();
                        tokio::spawn(handle_packet(
                            packet,
                            client_addr,
                            listener.clone(),
                            blocklist.clone(),
                            statistics.clone(),
                            upstreams.clone(),
                        ));
                    }
                    Err(err) => {
                        debug!(error = %err, "error receiving on proxy listener");
                    }
                }
            }
        }
    }
}

async fn handle_packet(
    packet: Vec<u8>,
    client_addr: SocketAddr,
    listener: Arc<UdpSocket>,
    blocklist: Arc<dyn BlocklistStorePort>,
    statistics: Arc<Statistics>,
    upstreams: Vec<SocketAddr>,
) {
    if !guard::is_well_formed(&packet) {
        statistics.record_forward_error();
        return;
    }

    let message = match Message::from_vec(&packet) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "dropping malformed packet");
            statistics.record_forward_error();
            return;
        }
    };

    let Some(query) = message.queries().first().cloned() else {
        statistics.record_forward_error();
        return;
    };

    let qtype = query.query_type();
    if qtype != RecordType::A && qtype != RecordType::AAAA {
        forwarding::forward(&packet, &upstreams, client_addr, listener, statistics).await;
        return;
    }

    let name = query.name().to_utf8();
    if blocklist.current().contains(&name) {
        statistics.record_blocked();
        let response = sinkhole::build(&query, message.header().id());
        if let Err(err) = listener.send_to(&response, client_addr).await {
            debug!(error = %err, %client_addr, "failed to send sinkhole response");
        }
    } else {
        statistics.record_allowed();
        forwarding::forward(&packet, &upstreams, client_addr, listener, statistics).await;
    }
}
