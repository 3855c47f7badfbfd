//! idled - idle sentinel daemon
//!
//! Checks once per interval whether the machine is in use (established TCP
//! connections, login sessions) and suspends it after enough idle checks.

use anyhow::{Context, Result};
use clap::Parser;
use idled::cli::Cli;
use idled::config::Config;
use idled::power::{DryRun, PowerControl, Systemctl};
use idled::sentinel::{check, Sentinel, ShutdownListener, ShutdownSignal, SystemProbe};
use tracing::{debug, info};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let probe = SystemProbe::from_config(&config)?;

    if cli.once {
        let report = tokio::task::spawn_blocking(move || check(&probe))
            .await
            .context("Activity check task failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("idled v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Effective configuration: {:?}", config);

    let power: Box<dyn PowerControl + Send> = if config.daemon.dry_run {
        info!("Dry-run mode: power actions are only logged");
        Box::new(DryRun)
    } else {
        Box::new(Systemctl::new())
    };

    let shutdown = ShutdownSignal::new();
    let listener = ShutdownListener::register(shutdown.clone())?;

    let sentinel = Sentinel::new(
        probe,
        power,
        config.daemon.power_action,
        config.daemon.idle_checks,
    )
    .with_shutdown(shutdown);

    sentinel
        .run(config.check_interval(), async move {
            listener.recv().await;
        })
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}
