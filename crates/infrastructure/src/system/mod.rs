pub mod linux;
pub mod macos;
pub mod windows;

use sentinel_dns_application::ports::{ConfiguratorError, DnsConfiguratorPort};
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Selects the platform backend at process start, one struct per OS
/// chosen via `cfg(target_os)`, mirroring the teacher's one-adapter-per-
/// backend convention for ports with multiple implementations.
pub fn detect_configurator() -> Arc<dyn DnsConfiguratorPort> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(linux::LinuxConfigurator::new())
    }
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacosConfigurator::new())
    }
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsConfigurator::new())
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        compile_error!("sentinel-dns has no DNS configurator backend for this target platform");
    }
}

/// Runs an external command with the shared 10s subprocess deadline,
/// translating timeouts and spawn failures into `ConfiguratorError`.
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<Output, ConfiguratorError> {
    let mut command = Command::new(program);
    command.args(args);
    match tokio::time::timeout(SUBPROCESS_TIMEOUT, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => {
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                Err(ConfiguratorError::PermissionDenied {
                    operation: format!("{program} {}", args.join(" ")),
                    source: err,
                })
            } else {
                Err(ConfiguratorError::Io(err))
            }
        }
        Err(_) => Err(ConfiguratorError::SubprocessTimeout(SUBPROCESS_TIMEOUT)),
    }
}

pub(crate) fn require_success(output: &Output, what: &str) -> Result<(), ConfiguratorError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(ConfiguratorError::CommandFailed(format!(
            "{what} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )))
    }
}
