//! Configuration management for idled.
//!
//! Loads settings from /etc/idled/config.toml or uses defaults.

use crate::error::SentinelError;
use crate::power::PowerAction;
use crate::session::SessionCriterion;
use crate::tcp_table::{AddressFamily, ConnectionTableSource, PROC_NET_TCP, PROC_NET_TCP6};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/idled/config.toml";

/// Daemon loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between two activity checks
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Consecutive idle checks before the power action runs
    #[serde(default = "default_idle_checks")]
    pub idle_checks: u32,

    /// Power action once idle
    #[serde(default)]
    pub power_action: PowerAction,

    /// Log the power action instead of running it
    #[serde(default)]
    pub dry_run: bool,
}

fn default_check_interval() -> u64 {
    60
}

fn default_idle_checks() -> u32 {
    3
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            idle_checks: default_idle_checks(),
            power_action: PowerAction::default(),
            dry_run: false,
        }
    }
}

/// Network activity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Count any established non-loopback connection.
    /// Unset means "yes" unless `interface` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_loopback: Option<bool>,

    /// Only count connections bound to this interface's addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    /// IPv4 connection table
    #[serde(default = "default_tcp_table")]
    pub tcp_table: PathBuf,

    /// IPv6 connection table
    #[serde(default = "default_tcp6_table")]
    pub tcp6_table: PathBuf,
}

fn default_tcp_table() -> PathBuf {
    PathBuf::from(PROC_NET_TCP)
}

fn default_tcp6_table() -> PathBuf {
    PathBuf::from(PROC_NET_TCP6)
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            exclude_loopback: None,
            interface: None,
            tcp_table: default_tcp_table(),
            tcp6_table: default_tcp6_table(),
        }
    }
}

/// The network strategy selected by configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkStrategy {
    ExcludeLoopback,
    Interface(String),
}

impl NetworkConfig {
    /// Resolve the two knobs into exactly one strategy
    pub fn strategy(&self) -> std::result::Result<NetworkStrategy, SentinelError> {
        match (self.exclude_loopback, self.interface.as_deref()) {
            (Some(true), Some(_)) => Err(SentinelError::config(
                "network.exclude_loopback and network.interface are mutually exclusive",
            )),
            (_, Some(name)) if name.trim().is_empty() => {
                Err(SentinelError::config("network.interface is empty"))
            }
            (_, Some(name)) => Ok(NetworkStrategy::Interface(name.trim().to_string())),
            (Some(false), None) => Err(SentinelError::config(
                "no network strategy: set network.exclude_loopback or network.interface",
            )),
            (None, None) | (Some(true), None) => Ok(NetworkStrategy::ExcludeLoopback),
        }
    }

    pub fn ipv4_source(&self) -> ConnectionTableSource {
        ConnectionTableSource::new(&self.tcp_table, AddressFamily::V4)
    }

    pub fn ipv6_source(&self) -> ConnectionTableSource {
        ConnectionTableSource::new(&self.tcp6_table, AddressFamily::V6)
    }
}

/// Session probe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub criterion: SessionCriterion,
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load config from the default path, or return defaults if it does not exist
    pub fn load() -> Result<Self> {
        if !Path::new(CONFIG_PATH).exists() {
            info!("No config at {}, using defaults", CONFIG_PATH);
            return Ok(Config::default());
        }
        Self::load_from_path(CONFIG_PATH)
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the daemon cannot run with
    pub fn validate(&self) -> std::result::Result<(), SentinelError> {
        if self.daemon.check_interval_secs == 0 {
            return Err(SentinelError::config("daemon.check_interval_secs must be > 0"));
        }
        if self.daemon.idle_checks == 0 {
            return Err(SentinelError::config("daemon.idle_checks must be > 0"));
        }
        self.network.strategy()?;
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.daemon.check_interval_secs)
    }

    /// Render as TOML (for `--print-config`)
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.daemon.check_interval_secs, 60);
        assert_eq!(config.daemon.idle_checks, 3);
        assert_eq!(config.daemon.power_action, PowerAction::Suspend);
        assert!(!config.daemon.dry_run);
        assert_eq!(config.network.tcp_table, PathBuf::from("/proc/net/tcp"));
        assert_eq!(config.network.tcp6_table, PathBuf::from("/proc/net/tcp6"));
        assert_eq!(config.session.criterion, SessionCriterion::NonEmpty);
        assert_eq!(config.network.strategy().unwrap(), NetworkStrategy::ExcludeLoopback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[daemon]
check_interval_secs = 30
power_action = "poweroff"

[network]
interface = "enp3s0"

[session]
criterion = "active_marker"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.daemon.check_interval_secs, 30);
        assert_eq!(config.daemon.power_action, PowerAction::Poweroff);
        // Defaults for missing fields
        assert_eq!(config.daemon.idle_checks, 3);
        assert_eq!(
            config.network.strategy().unwrap(),
            NetworkStrategy::Interface("enp3s0".to_string())
        );
        assert_eq!(config.session.criterion, SessionCriterion::ActiveMarker);
    }

    #[test]
    fn test_both_strategies_rejected() {
        let toml_str = r#"
[network]
exclude_loopback = true
interface = "eth0"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.validate(), Err(SentinelError::Config(_))));
    }

    #[test]
    fn test_no_strategy_rejected() {
        let config: Config = toml::from_str("[network]\nexclude_loopback = false\n").unwrap();
        assert!(matches!(config.validate(), Err(SentinelError::Config(_))));
    }

    #[test]
    fn test_blank_interface_rejected() {
        let config: Config = toml::from_str("[network]\ninterface = \"  \"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = Config::default();
        config.daemon.idle_checks = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.daemon.check_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[daemon]\nidle_checks = 5\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.daemon.idle_checks, 5);

        fs::write(&path, "[daemon\nidle_checks = ").unwrap();
        assert!(Config::load_from_path(&path).is_err());
        assert!(Config::load_from_path(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_strategy() {
        let mut config = Config::default();
        config.network.interface = Some("wlan0".to_string());
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(
            parsed.network.strategy().unwrap(),
            NetworkStrategy::Interface("wlan0".to_string())
        );
    }
}
