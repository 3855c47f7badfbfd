//! Row decoder for `/proc/net/tcp` and `/proc/net/tcp6`.
//!
//! Row format (trailing columns ignored):
//! `sl local_address rem_address st ...`
//! e.g. `0: 0100007F:0277 00000000:0000 0A ...`
//!
//! Addresses are stored as native 32-bit words, so on little-endian hosts
//! every 4-byte group is byte-reversed. Ports are printed big-endian.

use super::types::{AddressFamily, TcpConnection, TcpState};
use crate::error::{Result, SentinelError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Minimum number of columns a data row must carry
const MIN_FIELDS: usize = 4;

/// Hex width of the port half of an `addr:port` token
const PORT_HEX_LEN: usize = 4;

/// Decode one trimmed data row.
///
/// `family` is the family of the table the row came from; an address of the
/// other width is rejected.
pub fn decode_row(line: &str, family: AddressFamily) -> Result<TcpConnection> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(SentinelError::parse(format!(
            "expected at least {} fields, got {}",
            MIN_FIELDS,
            fields.len()
        )));
    }

    let (local_address, local_port) = decode_endpoint(fields[1])
        .map_err(|e| SentinelError::parse(format!("local address: {}", e)))?;
    let (remote_address, remote_port) = decode_endpoint(fields[2])
        .map_err(|e| SentinelError::parse(format!("remote address: {}", e)))?;

    for addr in [local_address, remote_address] {
        if family_of(addr) != family {
            return Err(SentinelError::parse(format!(
                "{} address {} in {} table",
                family_of(addr),
                addr,
                family
            )));
        }
    }

    let state = decode_state(fields[3])?;

    Ok(TcpConnection {
        local_address,
        local_port,
        remote_address,
        remote_port,
        state,
    })
}

/// Decode an `ADDRESS:PORT` hex token; the address width selects the family
pub fn decode_endpoint(token: &str) -> Result<(IpAddr, u16)> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 2 {
        return Err(SentinelError::parse(format!(
            "invalid address:port token '{}'",
            token
        )));
    }

    let family = AddressFamily::from_hex_len(parts[0].len()).ok_or_else(|| {
        SentinelError::parse(format!("invalid address hex length: {}", parts[0].len()))
    })?;

    let address = decode_address(parts[0], family)?;
    let port = decode_port(parts[1])?;
    Ok((address, port))
}

/// Decode a kernel address hex blob of the given family
pub fn decode_address(hex: &str, family: AddressFamily) -> Result<IpAddr> {
    if hex.len() != family.hex_len() {
        return Err(SentinelError::parse(format!(
            "invalid {} hex length: {}",
            family,
            hex.len()
        )));
    }

    match family {
        AddressFamily::V4 => {
            let mut bytes = [0u8; 4];
            hex::decode_to_slice(hex, &mut bytes)
                .map_err(|e| SentinelError::parse(format!("invalid IPv4 hex '{}': {}", hex, e)))?;
            bytes.reverse();
            Ok(IpAddr::V4(Ipv4Addr::from(bytes)))
        }
        AddressFamily::V6 => {
            let mut bytes = [0u8; 16];
            hex::decode_to_slice(hex, &mut bytes)
                .map_err(|e| SentinelError::parse(format!("invalid IPv6 hex '{}': {}", hex, e)))?;
            for word in bytes.chunks_exact_mut(4) {
                word.reverse();
            }
            Ok(IpAddr::V6(Ipv6Addr::from(bytes)))
        }
    }
}

/// Decode a 4-digit big-endian port
pub fn decode_port(hex: &str) -> Result<u16> {
    if hex.len() != PORT_HEX_LEN {
        return Err(SentinelError::parse(format!(
            "invalid port hex length: {}",
            hex.len()
        )));
    }

    let mut bytes = [0u8; 2];
    hex::decode_to_slice(hex, &mut bytes)
        .map_err(|e| SentinelError::parse(format!("invalid port hex '{}': {}", hex, e)))?;
    Ok(u16::from_be_bytes(bytes))
}

/// Decode the `st` column
pub fn decode_state(hex: &str) -> Result<TcpState> {
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SentinelError::parse(format!("invalid state '{}'", hex)));
    }

    u8::from_str_radix(hex, 16)
        .map(TcpState::from_code)
        .map_err(|e| SentinelError::parse(format!("invalid state '{}': {}", hex, e)))
}

fn family_of(addr: IpAddr) -> AddressFamily {
    match addr {
        IpAddr::V4(_) => AddressFamily::V4,
        IpAddr::V6(_) => AddressFamily::V6,
    }
}
