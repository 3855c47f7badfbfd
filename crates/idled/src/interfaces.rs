//! Network interface address lookup (getifaddrs).

use crate::error::{Result, SentinelError};
use nix::ifaddrs::getifaddrs;
use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddrV4, SocketAddrV6};

/// IPv4 and IPv6 addresses currently bound to interface `name`.
///
/// An interface that exists but carries no address yields an empty set;
/// an unknown interface is an error.
pub fn interface_addresses(name: &str) -> Result<BTreeSet<IpAddr>> {
    let ifaddrs = getifaddrs().map_err(|e| SentinelError::Interface {
        name: name.to_string(),
        reason: format!("getifaddrs failed: {}", e),
    })?;

    let entries = ifaddrs.map(|ifaddr| {
        let ip = ifaddr.address.as_ref().and_then(|storage| {
            if let Some(sin) = storage.as_sockaddr_in() {
                Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
            } else {
                storage
                    .as_sockaddr_in6()
                    .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
            }
        });
        (ifaddr.interface_name, ip)
    });

    collect_addresses(name, entries)
}

/// Pick the addresses of `name` out of `(interface, address)` entries
fn collect_addresses<I>(name: &str, entries: I) -> Result<BTreeSet<IpAddr>>
where
    I: IntoIterator<Item = (String, Option<IpAddr>)>,
{
    let mut found = false;
    let mut addresses = BTreeSet::new();

    for (iface, ip) in entries {
        if iface != name {
            continue;
        }
        found = true;
        if let Some(ip) = ip {
            addresses.insert(ip);
        }
    }

    if !found {
        return Err(SentinelError::Interface {
            name: name.to_string(),
            reason: "no such interface".to_string(),
        });
    }

    Ok(addresses)
}
