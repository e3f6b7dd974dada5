use sentinel_dns_domain::{CliOverrides, Config};
use std::path::Path;
use tracing::info;

pub fn load_config(config_path: Option<&Path>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = ?config_path.unwrap_or_else(|| Path::new("default")),
        dns_preferred_port = config.dns.preferred_port,
        dns_fallback_port = config.dns.fallback_port,
        control_port = config.control.port,
        dry_run = config.dry_run,
        "configuration loaded"
    );

    Ok(config)
}
