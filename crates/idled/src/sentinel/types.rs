//! Sentinel types and data structures

use crate::power::PowerAction;
use crate::tcp_table::NetworkVerdict;
use serde::Serialize;

/// Result of the network half of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NetworkStatus {
    /// Connection tables were scanned under a policy
    Scanned { result: NetworkVerdict },
    /// The configured interface could not be looked up (counts as active)
    InterfaceUnavailable { interface: String, error: String },
    /// The configured interface has no address, so nothing can use it
    InterfaceUnaddressed { interface: String },
}

impl NetworkStatus {
    pub fn is_active(&self) -> bool {
        match self {
            NetworkStatus::Scanned { result } => result.is_active(),
            NetworkStatus::InterfaceUnavailable { .. } => true,
            NetworkStatus::InterfaceUnaddressed { .. } => false,
        }
    }
}

/// One complete activity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub network: NetworkStatus,
    /// Not asked when the network already showed activity
    pub sessions_active: Option<bool>,
    pub in_use: bool,
}

/// What the idle counter says after one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum IdleVerdict {
    Busy,
    Idle { count: u32, required: u32 },
    PowerDue { count: u32 },
}

/// What one tick of the sentinel loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    InUse,
    Idle { count: u32, required: u32 },
    PowerExecuted { action: PowerAction },
    PowerFailed { action: PowerAction, error: String },
}
