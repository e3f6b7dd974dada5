pub mod get_stats;
pub mod get_status;
pub mod reload_blocklist;
pub mod toggle_blocking;

pub use get_stats::GetStatsUseCase;
pub use get_status::{GetStatusUseCase, StatusReport};
pub use reload_blocklist::ReloadBlocklistUseCase;
pub use toggle_blocking::ToggleBlockingUseCase;
