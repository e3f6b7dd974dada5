use crate::{ProxyHealthJob, StatsLogJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs. Register jobs with the
/// builder, then call `.start()` once during lifecycle startup.
pub struct JobRunner {
    proxy_health: Option<ProxyHealthJob>,
    stats_log: Option<StatsLogJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            proxy_health: None,
            stats_log: None,
        }
    }

    pub fn with_proxy_health(mut self, job: ProxyHealthJob) -> Self {
        self.proxy_health = Some(job);
        self
    }

    pub fn with_stats_log(mut self, job: StatsLogJob) -> Self {
        self.stats_log = Some(job);
        self
    }

    pub async fn start(self) {
        info!("starting background job runner");

        if let Some(job) = self.proxy_health {
            Arc::new(job).start().await;
        }
        if let Some(job) = self.stats_log {
            Arc::new(job).start().await;
        }

        info!("all background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
