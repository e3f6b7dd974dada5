use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic, process-lifetime query counters. Cleared only by restarting
/// the process — there is no reset operation.
#[derive(Debug)]
pub struct Statistics {
    queries_seen: AtomicU64,
    queries_blocked: AtomicU64,
    queries_allowed: AtomicU64,
    forward_errors: AtomicU64,
    started_at: Instant,
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            queries_seen: AtomicU64::new(0),
            queries_blocked: AtomicU64::new(0),
            queries_allowed: AtomicU64::new(0),
            forward_errors: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_seen(&self) {
        self.queries_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocked(&self) {
        self.queries_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_allowed(&self) {
        self.queries_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forward_error(&self) {
        self.forward_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            queries_seen: self.queries_seen.load(Ordering::Relaxed),
            queries_blocked: self.queries_blocked.load(Ordering::Relaxed),
            queries_allowed: self.queries_allowed.load(Ordering::Relaxed),
            forward_errors: self.forward_errors.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsSnapshot {
    pub queries_seen: u64,
    pub queries_blocked: u64,
    pub queries_allowed: u64,
    pub forward_errors: u64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = Statistics::new();
        let snap = stats.snapshot();
        assert_eq!(snap.queries_seen, 0);
        assert_eq!(snap.queries_blocked, 0);
    }

    #[test]
    fn counters_advance_independently() {
        let stats = Statistics::new();
        stats.record_seen();
        stats.record_seen();
        stats.record_blocked();
        stats.record_forward_error();

        let snap = stats.snapshot();
        assert_eq!(snap.queries_seen, 2);
        assert_eq!(snap.queries_blocked, 1);
        assert_eq!(snap.queries_allowed, 0);
        assert_eq!(snap.forward_errors, 1);
    }
}
