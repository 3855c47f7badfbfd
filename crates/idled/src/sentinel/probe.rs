//! Activity probes: network tables and login sessions.

use super::types::{CheckReport, NetworkStatus};
use crate::config::{Config, NetworkStrategy};
use crate::error::Result;
use crate::interfaces::interface_addresses;
use crate::session::SessionProbe;
use crate::tcp_table::{scan_tables, ActivityPolicy, ConnectionTableSource};
use tracing::{debug, warn};

/// The two signals one activity check is based on
pub trait ActivityProbe {
    /// Network half of the check
    fn network(&self) -> NetworkStatus;

    /// Whether any login session counts as active
    fn sessions_active(&self) -> bool;
}

/// Run one check: network first, sessions only if the network looks idle
pub fn check(probe: &dyn ActivityProbe) -> CheckReport {
    let network = probe.network();
    if network.is_active() {
        return CheckReport {
            network,
            sessions_active: None,
            in_use: true,
        };
    }

    let sessions_active = probe.sessions_active();
    CheckReport {
        network,
        sessions_active: Some(sessions_active),
        in_use: sessions_active,
    }
}

/// Probe backed by the live system
#[derive(Debug, Clone)]
pub struct SystemProbe {
    strategy: NetworkStrategy,
    ipv4: ConnectionTableSource,
    ipv6: ConnectionTableSource,
    sessions: SessionProbe,
}

impl SystemProbe {
    /// Build from a configuration; fails if no single network strategy is selected
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            strategy: config.network.strategy()?,
            ipv4: config.network.ipv4_source(),
            ipv6: config.network.ipv6_source(),
            sessions: SessionProbe::new(config.session.criterion),
        })
    }

    /// Replace the session probe (used to point at another loginctl)
    pub fn with_sessions(mut self, sessions: SessionProbe) -> Self {
        self.sessions = sessions;
        self
    }

    /// Policy for this check. Interface addresses are looked up every time
    /// since they may change while the daemon runs.
    fn policy(&self) -> std::result::Result<ActivityPolicy, NetworkStatus> {
        match &self.strategy {
            NetworkStrategy::ExcludeLoopback => Ok(ActivityPolicy::ExcludeLoopback),
            NetworkStrategy::Interface(name) => {
                let addresses = interface_addresses(name).map_err(|e| {
                    warn!("Could not read addresses of {}: {}", name, e);
                    NetworkStatus::InterfaceUnavailable {
                        interface: name.clone(),
                        error: e.to_string(),
                    }
                })?;

                if addresses.is_empty() {
                    debug!("Interface {} has no addresses", name);
                    return Err(NetworkStatus::InterfaceUnaddressed {
                        interface: name.clone(),
                    });
                }

                ActivityPolicy::from_query(false, Some(addresses)).map_err(|e| {
                    NetworkStatus::InterfaceUnavailable {
                        interface: name.clone(),
                        error: e.to_string(),
                    }
                })
            }
        }
    }
}

impl ActivityProbe for SystemProbe {
    fn network(&self) -> NetworkStatus {
        let policy = match self.policy() {
            Ok(policy) => policy,
            Err(status) => return status,
        };

        debug!("Scanning connection tables with policy {}", policy);
        NetworkStatus::Scanned {
            result: scan_tables(&[&self.ipv4, &self.ipv6], &policy),
        }
    }

    fn sessions_active(&self) -> bool {
        self.sessions.is_any_user_active()
    }
}
