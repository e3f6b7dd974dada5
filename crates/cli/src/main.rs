mod bootstrap;
mod di;
mod signals;

use clap::Parser;
use di::{DnsServices, Repositories, UseCases};
use sentinel_dns_application::services::LifecycleManager;
use sentinel_dns_application::LifecycleError;
use sentinel_dns_domain::CliOverrides;
use sentinel_dns_jobs::{JobRunner, ProxyHealthJob, StatsLogJob};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Sentinel DNS Guard: a loopback DNS proxy that sinkholes blocked
/// domains and restores the host's original resolvers when disabled.
#[derive(Parser, Debug)]
#[command(name = "sentinel-dnsd", version, about)]
struct Cli {
    /// Load configuration from this TOML file instead of the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log intended actions without touching system DNS or the network.
    #[arg(long)]
    dry_run: bool,

    /// Override the configured blocklist file path.
    #[arg(long)]
    blocklist_path: Option<PathBuf>,

    /// Print current blocking status and exit.
    #[arg(long)]
    status: bool,

    /// Enable blocking (point system DNS at the proxy) and exit.
    #[arg(long)]
    enable: bool,

    /// Disable blocking (restore the host's original resolvers) and exit.
    #[arg(long)]
    disable: bool,

    /// Force a restore to fully automatic (DHCP) DNS and exit, bypassing
    /// the saved backup. For recovering from a backup that looks wrong.
    #[arg(long)]
    force_restore_dns: bool,

    /// Resolve a well-known name against the host's current resolvers to
    /// confirm external DNS works, then exit.
    #[arg(long)]
    test_dns_resolution: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        blocklist_path: cli.blocklist_path.clone(),
        dry_run: if cli.dry_run { Some(true) } else { None },
    };

    let config = match bootstrap::load_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(1);
        }
    };
    bootstrap::init_logging(&config);

    let repos = Repositories::new(&config);
    let dns = match DnsServices::new(&config, repos.blocklist_store.clone()) {
        Ok(dns) => dns,
        Err(err) => {
            error!(%err, "failed to initialize DNS services");
            return ExitCode::from(1);
        }
    };
    let use_cases = UseCases::new(&config, &repos, &dns);

    if let Err(err) = use_cases.reload.execute().await {
        error!(%err, "failed to load blocklist at startup");
        return ExitCode::from(1);
    }

    let lifecycle = Arc::new(LifecycleManager::new(
        repos.pid.clone(),
        repos.state.clone(),
        dns.configurator.clone(),
        dns.proxy.clone(),
        dns.probe.clone(),
        use_cases.toggle.clone(),
    ));

    if cli.status {
        return run_status(&use_cases).await;
    }
    if cli.enable {
        return run_toggle(&use_cases, true).await;
    }
    if cli.disable {
        return run_toggle(&use_cases, false).await;
    }
    if cli.force_restore_dns {
        return run_force_restore(&dns).await;
    }
    if cli.test_dns_resolution {
        return run_test_resolution(&dns).await;
    }

    run_daemon(config.control.bind_address.clone(), config.control.port, lifecycle, use_cases, dns).await
}

async fn run_status(use_cases: &UseCases) -> ExitCode {
    match use_cases.status.execute().await {
        Ok(report) => {
            println!(
                "running: {}\nblocking: {}\ndomains in list: {}\nmethod: {}\nqueries seen/blocked/allowed: {}/{}/{}\nuptime: {}s",
                report.is_running,
                report.is_blocking,
                report.domains_in_list,
                report.blocking_method,
                report.queries_seen,
                report.queries_blocked,
                report.queries_allowed,
                report.uptime_secs,
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read status: {err}");
            ExitCode::from(1)
        }
    }
}

async fn run_toggle(use_cases: &UseCases, enable: bool) -> ExitCode {
    match use_cases.toggle.execute(enable).await {
        Ok(state) => {
            println!("blocking is now {}", state.is_blocking);
            ExitCode::SUCCESS
        }
        Err(LifecycleError::NoOp(state)) => {
            println!("blocking is already {state}");
            ExitCode::SUCCESS
        }
        Err(LifecycleError::AlreadyRunning(pid)) => {
            eprintln!("another instance is already running (pid {pid})");
            ExitCode::from(2)
        }
        Err(LifecycleError::DnsIntegrityFailed { interface }) => {
            eprintln!("DNS integrity check failed on interface {interface}");
            ExitCode::from(3)
        }
        Err(err) => {
            eprintln!("failed to toggle blocking: {err}");
            ExitCode::from(1)
        }
    }
}

async fn run_force_restore(dns: &DnsServices) -> ExitCode {
    let interface = match dns.configurator.detect_interface().await {
        Ok(interface) => interface,
        Err(err) => {
            eprintln!("could not detect network interface: {err}");
            return ExitCode::from(1);
        }
    };
    if let Err(err) = dns.configurator.restore_automatic(&interface).await {
        eprintln!("failed to restore automatic DNS: {err}");
        return ExitCode::from(1);
    }
    println!("restored automatic DNS on {interface}");
    ExitCode::SUCCESS
}

async fn run_test_resolution(dns: &DnsServices) -> ExitCode {
    let server = std::net::SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::new(8, 8, 8, 8)), 53);
    if dns.probe.resolve_a("example.com", server).await {
        println!("external DNS resolution OK");
        ExitCode::SUCCESS
    } else {
        eprintln!("external DNS resolution failed");
        ExitCode::from(3)
    }
}

async fn run_daemon(
    control_bind: String,
    control_port: u16,
    lifecycle: Arc<LifecycleManager>,
    use_cases: UseCases,
    dns: DnsServices,
) -> ExitCode {
    if let Err(err) = lifecycle.startup().await {
        error!(%err, "startup failed");
        if let Err(shutdown_err) = lifecycle.shutdown().await {
            error!(%shutdown_err, "best-effort restore after failed startup also failed");
        }
        return match err {
            LifecycleError::AlreadyRunning(_) => ExitCode::from(2),
            LifecycleError::DnsIntegrityFailed { .. } => ExitCode::from(3),
            _ => ExitCode::from(1),
        };
    }

    let jobs_shutdown = CancellationToken::new();
    let job_runner = JobRunner::new()
        .with_proxy_health(ProxyHealthJob::new(dns.proxy.clone()).with_cancellation(jobs_shutdown.clone()))
        .with_stats_log(StatsLogJob::new(dns.statistics.clone()).with_cancellation(jobs_shutdown.clone()));
    job_runner.start().await;

    let api_state = sentinel_dns_api::AppState {
        get_status: use_cases.status.clone(),
        get_stats: use_cases.stats.clone(),
        toggle: use_cases.toggle.clone(),
        statistics: dns.statistics.clone(),
    };
    let control_addr: std::net::SocketAddr = format!("{control_bind}:{control_port}")
        .parse()
        .expect("control bind address and port must form a valid socket address");
    let router = sentinel_dns_api::create_api_routes(api_state);
    let control_listener = match tokio::net::TcpListener::bind(control_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %control_addr, "failed to bind control interface");
            jobs_shutdown.cancel();
            let _ = lifecycle.shutdown().await;
            return ExitCode::from(1);
        }
    };
    info!(%control_addr, "control interface listening");

    let control_shutdown = jobs_shutdown.clone();
    let control_task = tokio::spawn(async move {
        axum::serve(
            control_listener,
            router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move { control_shutdown.cancelled().await })
        .await
    });

    signals::wait_for_shutdown_signal().await;
    info!("shutdown signal received, restoring DNS before exit");

    jobs_shutdown.cancel();
    let shutdown_deadline = std::time::Duration::from_secs(15);
    match tokio::time::timeout(shutdown_deadline, lifecycle.shutdown()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(%err, "shutdown sequence reported an error"),
        Err(_) => {
            warn!("shutdown did not complete within the deadline, forcing exit");
            return ExitCode::from(1);
        }
    }
    let _ = control_task.await;

    ExitCode::SUCCESS
}
