use crate::ports::{ConfiguratorError, ProxyError};
use sentinel_dns_domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the Lifecycle Manager's orchestration use cases.
/// CLI and Control Interface adapters map these onto exit codes / HTTP
/// statuses at their own boundary.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Configurator(#[from] ConfiguratorError),
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("another instance is already running (pid {0})")]
    AlreadyRunning(u32),
    #[error("blocking is already {0}")]
    NoOp(&'static str),
    #[error("proxy is bound to a non-IPv4 address, which no supported platform backend can target")]
    ProxyNotIpv4,
    #[error("restored automatic DNS on interface {interface} but external resolution still fails")]
    DnsIntegrityFailed { interface: String },
}
