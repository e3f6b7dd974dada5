pub mod forwarding;
pub mod guard;
pub mod probe;
pub mod proxy;
pub mod sinkhole;

pub use probe::HickoryDnsProbe;
pub use proxy::DnsProxy;
