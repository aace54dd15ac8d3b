use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use resourcer::config::{self, Config, ConfigWarning, load_config, load_config_from_path};
use resourcer::logging::{LogFormat, init_tracing, parse_level};
use resourcer::system::{Collector, Monitor, SharedSnapshot};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "resourcer",
    about = "Samples host platform, CPU, memory and uptime into a live snapshot"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CPU load sampling interval in milliseconds
    #[arg(long)]
    cpu_interval_ms: Option<u64>,

    /// Memory sampling interval in milliseconds
    #[arg(long)]
    memory_interval_ms: Option<u64>,

    /// Uptime sampling interval in milliseconds
    #[arg(long)]
    uptime_interval_ms: Option<u64>,

    /// How often the snapshot is printed, in milliseconds
    #[arg(long)]
    report_interval_ms: Option<u64>,

    /// Sample every metric once, print one snapshot and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Pretty-print snapshot JSON.
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: text, json
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (config, warnings) = load_config_for_cli(&cli);

    init_tracing(
        parse_level(&config.logging.level),
        LogFormat::from_str_config(&config.logging.format),
    )?;
    if let Some(path) = cli.config.clone().or_else(config::config_path) {
        info!(path = %path.display(), "configuration source");
    }
    for warning in &warnings {
        warning.log();
    }

    let monitor = Monitor::new(Arc::new(Collector::new()), config.monitor_options());
    let cancel = CancellationToken::new();

    if cli.once {
        return run_once(&monitor, &cancel, config.report.pretty).await;
    }

    let scheduler = monitor
        .start(&cancel)
        .await
        .wrap_err("failed to collect static host facts")?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.cancel();
    });

    report_loop(
        monitor.snapshot(),
        Duration::from_millis(config.report.interval_ms),
        config.report.pretty,
        &cancel,
    )
    .await?;

    scheduler
        .await
        .map_err(|e| eyre!("scheduler task failed: {e}"))?;
    Ok(())
}

async fn run_once(monitor: &Monitor, cancel: &CancellationToken, pretty: bool) -> Result<()> {
    monitor
        .initialize(cancel)
        .await
        .wrap_err("failed to collect static host facts")?;

    let samplers = monitor.samplers(cancel);
    let (cpu, memory, uptime) = tokio::join!(
        samplers.sample_cpu_load(),
        samplers.sample_memory(),
        samplers.sample_uptime(),
    );
    for (metric, result) in [("cpu_load", cpu), ("memory", memory), ("uptime", uptime)] {
        if let Err(e) = result {
            warn!(metric, error = %e, "sampling failed");
        }
    }

    print_snapshot(&monitor.snapshot(), pretty).await
}

async fn report_loop(
    snapshot: SharedSnapshot,
    every: Duration,
    pretty: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = ticker.tick() => {
                print_snapshot(&snapshot, pretty).await?;
            }
        }
    }
}

async fn print_snapshot(snapshot: &SharedSnapshot, pretty: bool) -> Result<()> {
    let current = snapshot.read().await;
    info!(summary = %current.summary(), "snapshot");
    let json = if pretty {
        serde_json::to_string_pretty(&current)?
    } else {
        serde_json::to_string(&current)?
    };
    println!("{json}");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Config with CLI overrides applied. Warnings are returned because the
/// subscriber is installed from the result.
fn load_config_for_cli(cli: &Cli) -> (Config, Vec<ConfigWarning>) {
    let (mut config, mut warnings) = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ms) = cli.cpu_interval_ms {
        config.sampling.cpu_interval_ms = ms;
    }
    if let Some(ms) = cli.memory_interval_ms {
        config.sampling.memory_interval_ms = ms;
    }
    if let Some(ms) = cli.uptime_interval_ms {
        config.sampling.uptime_interval_ms = ms;
    }
    if let Some(ms) = cli.report_interval_ms {
        config.report.interval_ms = ms;
    }
    if cli.pretty {
        config.report.pretty = true;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }

    warnings.extend(config.sanitize());
    (config, warnings)
}
