use sentinel_dns_domain::{Statistics, StatisticsSnapshot};
use std::sync::Arc;

/// Exposes the running query counters to the Control Interface's
/// `/stats` endpoint.
pub struct GetStatsUseCase {
    statistics: Arc<Statistics>,
}

impl GetStatsUseCase {
    pub fn new(statistics: Arc<Statistics>) -> Self {
        Self { statistics }
    }

    pub fn execute(&self) -> StatisticsSnapshot {
        self.statistics.snapshot()
    }
}
