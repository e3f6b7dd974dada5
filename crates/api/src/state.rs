use sentinel_dns_application::use_cases::{GetStatsUseCase, GetStatusUseCase, ToggleBlockingUseCase};
use sentinel_dns_domain::Statistics;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub get_status: Arc<GetStatusUseCase>,
    pub get_stats: Arc<GetStatsUseCase>,
    pub toggle: Arc<ToggleBlockingUseCase>,
    pub statistics: Arc<Statistics>,
}
