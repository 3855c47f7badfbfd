//! Activity policies: which established connections count as use of the machine.

use super::types::TcpConnection;
use crate::error::{Result, SentinelError};
use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

/// Strategy deciding whether one connection is evidence of use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityPolicy {
    /// Any established connection not bound to 127.0.0.0/8 or ::1
    ExcludeLoopback,
    /// Established connections whose local address belongs to an interface
    InterfaceAddresses(BTreeSet<IpAddr>),
}

impl ActivityPolicy {
    /// Build the policy from the two configuration knobs.
    ///
    /// Exactly one strategy must be selected, and an interface filter must
    /// name at least one address.
    pub fn from_query(
        exclude_loopback: bool,
        interface_filter: Option<BTreeSet<IpAddr>>,
    ) -> Result<Self> {
        match (exclude_loopback, interface_filter) {
            (true, None) => Ok(ActivityPolicy::ExcludeLoopback),
            (false, Some(addresses)) => Self::interface_addresses(addresses),
            (true, Some(_)) => Err(SentinelError::config(
                "loopback exclusion and interface filter are mutually exclusive",
            )),
            (false, None) => Err(SentinelError::config(
                "no network activity strategy selected",
            )),
        }
    }

    /// Interface strategy over a non-empty address set
    pub fn interface_addresses(addresses: BTreeSet<IpAddr>) -> Result<Self> {
        if addresses.is_empty() {
            return Err(SentinelError::config(
                "interface filter references no addresses",
            ));
        }
        Ok(ActivityPolicy::InterfaceAddresses(addresses))
    }

    /// Whether `conn` counts as real use under this policy
    pub fn is_active(&self, conn: &TcpConnection) -> bool {
        if !conn.state.is_established() {
            return false;
        }

        match self {
            ActivityPolicy::ExcludeLoopback => !is_loopback(conn.local_address),
            ActivityPolicy::InterfaceAddresses(addresses) => {
                addresses.contains(&conn.local_address)
                    || addresses.contains(&conn.local_address.to_canonical())
            }
        }
    }
}

impl fmt::Display for ActivityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityPolicy::ExcludeLoopback => write!(f, "exclude-loopback"),
            ActivityPolicy::InterfaceAddresses(addresses) => {
                let list: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
                write!(f, "interface-addresses[{}]", list.join(", "))
            }
        }
    }
}

/// 127.0.0.0/8 for IPv4, exactly ::1 for IPv6
fn is_loopback(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.octets()[0] == 127,
        IpAddr::V6(v6) => v6 == Ipv6Addr::LOCALHOST,
    }
}
