use sentinel_dns_application::ports::ProxyControlPort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Periodic (30s) self-check that the proxy's listening socket is still
/// bound (§4.2 "Health"). Loss of binding is surfaced as an error event
/// and the job attempts a single rebind before waiting for the next tick.
pub struct ProxyHealthJob {
    proxy: Arc<dyn ProxyControlPort>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl ProxyHealthJob {
    pub fn new(proxy: Arc<dyn ProxyControlPort>) -> Self {
        Self {
            proxy,
            interval_secs: 30,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "starting proxy health job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ProxyHealthJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if self.proxy.is_bound() {
                            continue;
                        }
                        error!("proxy listener lost its binding");
                        match self.proxy.start().await {
                            Ok(addr) => warn!(%addr, "proxy rebound after unexpected loss of binding"),
                            Err(err) => error!(error = %err, "failed to rebind proxy after health check failure"),
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sentinel_dns_application::ports::ProxyError;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyProxy {
        bound: std::sync::atomic::AtomicBool,
        start_calls: AtomicUsize,
    }

    #[async_trait]
    impl ProxyControlPort for FlakyProxy {
        async fn start(&self) -> Result<SocketAddr, ProxyError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            self.bound.store(true, Ordering::SeqCst);
            Ok("127.0.0.1:5353".parse().unwrap())
        }

        async fn stop(&self) {
            self.bound.store(false, Ordering::SeqCst);
        }

        fn bound_addr(&self) -> Option<SocketAddr> {
            self.is_bound().then(|| "127.0.0.1:5353".parse().unwrap())
        }

        fn is_bound(&self) -> bool {
            self.bound.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rebinds_after_losing_its_binding() {
        let proxy = Arc::new(FlakyProxy {
            bound: std::sync::atomic::AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
        });
        let shutdown = CancellationToken::new();
        let job = Arc::new(
            ProxyHealthJob::new(proxy.clone())
                .with_interval(1)
                .with_cancellation(shutdown.clone()),
        );

        job.start().await;
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert_eq!(proxy.start_calls.load(Ordering::SeqCst), 1);
        assert!(proxy.is_bound());
        shutdown.cancel();
    }
}
