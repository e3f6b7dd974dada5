use async_trait::async_trait;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to bind proxy listener: {0}")]
    BindFailed(std::io::Error),
    #[error("bind timed out after 5s")]
    BindTimeout,
}

/// Controls the lifecycle of the running DNS Proxy (§4.2) from outside
/// the `infrastructure` crate, so the Lifecycle Manager and the Control
/// Interface can start/stop/inspect it without depending on its
/// concrete socket types.
#[async_trait]
pub trait ProxyControlPort: Send + Sync {
    /// Binds the listener and spawns the query-handling loop. Idempotent:
    /// calling `start` while already running is a no-op that returns the
    /// existing bound address.
    async fn start(&self) -> Result<SocketAddr, ProxyError>;

    /// Stops the listener, cancels outstanding forwards, and returns once
    /// the socket is released. Idempotent.
    async fn stop(&self);

    /// The address the listener is currently bound to, if running.
    fn bound_addr(&self) -> Option<SocketAddr>;

    /// `true` if the listener is still bound (used by the periodic
    /// self-check, §4.2 "Health").
    fn is_bound(&self) -> bool;
}

/// Probes whether a DNS resolution path is actually working, used by the
/// startup integrity check and by `Configure` step 2 (verify the proxy
/// answers before pointing the host at it).
#[async_trait]
pub trait DnsProbePort: Send + Sync {
    async fn resolve_a(&self, name: &str, server: SocketAddr) -> bool;
}
