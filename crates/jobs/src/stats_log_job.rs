use sentinel_dns_domain::Statistics;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Periodically logs a snapshot of the query counters at `info` level, so
/// an operator tailing the daemon's logs can see traffic volume without
/// polling the Control Interface.
pub struct StatsLogJob {
    statistics: Arc<Statistics>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl StatsLogJob {
    pub fn new(statistics: Arc<Statistics>) -> Self {
        Self {
            statistics,
            interval_secs: 300,
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
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("StatsLogJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let snapshot = self.statistics.snapshot();
                        info!(
                            seen = snapshot.queries_seen,
                            blocked = snapshot.queries_blocked,
                            allowed = snapshot.queries_allowed,
                            forward_errors = snapshot.forward_errors,
                            uptime_secs = snapshot.uptime_secs,
                            "query statistics"
                        );
                    }
                }
            }
        });
    }
}
