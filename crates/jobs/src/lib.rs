pub mod proxy_health_job;
pub mod runner;
pub mod stats_log_job;

pub use proxy_health_job::ProxyHealthJob;
pub use runner::JobRunner;
pub use stats_log_job::StatsLogJob;
