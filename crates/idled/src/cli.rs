//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap. Flags override the config file.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// idled - suspend the machine when nobody is using it
#[derive(Parser, Debug)]
#[command(name = "idled")]
#[command(about = "Idle sentinel - suspends the machine after consecutive idle checks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: /etc/idled/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Consecutive idle checks before the power action
    #[arg(short, long, value_name = "N")]
    pub idle_checks: Option<u32>,

    /// Seconds between checks
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Only count connections on this interface (instead of excluding loopback)
    #[arg(long, value_name = "NAME")]
    pub interface: Option<String>,

    /// Log the power action instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single check, print it as JSON and exit
    #[arg(long)]
    pub once: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(n) = self.idle_checks {
            config.daemon.idle_checks = n;
        }
        if let Some(secs) = self.interval {
            config.daemon.check_interval_secs = secs;
        }
        if let Some(name) = &self.interface {
            config.network.interface = Some(name.clone());
            config.network.exclude_loopback = None;
        }
        if self.dry_run {
            config.daemon.dry_run = true;
        }
    }
}
