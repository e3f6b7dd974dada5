use crate::dns::sinkhole::FORWARD_DEADLINE;
use sentinel_dns_domain::Statistics;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;

/// Relays one client query to a randomly chosen upstream and sends back
/// whatever bytes come first, verbatim. Transaction-id collisions across
/// concurrent clients cannot happen: every forward opens its own
/// ephemeral socket, so an upstream's reply only ever reaches the socket
/// that sent the matching query.
pub async fn forward(
    query_bytes: &[u8],
    upstreams: &[SocketAddr],
    client_addr: SocketAddr,
    listener: Arc<UdpSocket>,
    statistics: Arc<Statistics>,
) {
    let Some(upstream) = pick_upstream(upstreams) else {
        statistics.record_forward_error();
        return;
    };

    let outbound = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(sock) => sock,
        Err(err) => {
            debug!(error = %err, "failed to open ephemeral forwarding socket");
            statistics.record_forward_error();
            return;
        }
    };

    if let Err(err) = outbound.send_to(query_bytes, upstream).await {
        debug!(error = %err, %upstream, "failed to send query upstream");
        statistics.record_forward_error();
        return;
    }

    let mut buf = [0u8; 65535];
    let recv = tokio::time::timeout(FORWARD_DEADLINE, outbound.recv(&mut buf)).await;
    match recv {
        Ok(Ok(len)) => {
            if let Err(err) = listener.send_to(&buf[..len], client_addr).await {
                debug!(error = %err, %client_addr, "failed to relay upstream reply to client");
                statistics.record_forward_error();
            }
        }
        Ok(Err(err)) => {
            debug!(error = %err, %upstream, "upstream socket error while awaiting reply");
            statistics.record_forward_error();
        }
        Err(_) => {
            debug!(%upstream, "upstream did not reply within the forward deadline");
            statistics.record_forward_error();
        }
    }
}

fn pick_upstream(upstreams: &[SocketAddr]) -> Option<SocketAddr> {
    if upstreams.is_empty() {
        return None;
    }
    let idx = fastrand::usize(..upstreams.len());
    Some(upstreams[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_upstream_returns_none_when_empty() {
        assert_eq!(pick_upstream(&[]), None);
    }

    #[test]
    fn pick_upstream_returns_configured_address_when_single() {
        let addr: SocketAddr = "8.8.8.8:53".parse().unwrap();
        assert_eq!(pick_upstream(&[addr]), Some(addr));
    }
}
