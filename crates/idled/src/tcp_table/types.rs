//! Types shared by the connection-table reader, decoder and classifier.

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

/// Default kernel table for IPv4 sockets
pub const PROC_NET_TCP: &str = "/proc/net/tcp";

/// Default kernel table for IPv6 sockets
pub const PROC_NET_TCP6: &str = "/proc/net/tcp6";

/// Address family of a connection table, fixing the width of its address hex blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Number of hex characters an address of this family occupies
    pub fn hex_len(self) -> usize {
        match self {
            AddressFamily::V4 => 8,
            AddressFamily::V6 => 32,
        }
    }

    /// Infer the family from an address hex blob length
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            8 => Some(AddressFamily::V4),
            32 => Some(AddressFamily::V6),
            _ => None,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "ipv4"),
            AddressFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// TCP socket state as reported in the `st` column.
///
/// Only `Established` matters for idle detection; every other code is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TcpState {
    Established,
    Other(u8),
}

impl TcpState {
    pub const ESTABLISHED_CODE: u8 = 0x01;

    pub fn from_code(code: u8) -> Self {
        if code == Self::ESTABLISHED_CODE {
            TcpState::Established
        } else {
            TcpState::Other(code)
        }
    }

    pub fn code(self) -> u8 {
        match self {
            TcpState::Established => Self::ESTABLISHED_CODE,
            TcpState::Other(code) => code,
        }
    }

    pub fn is_established(self) -> bool {
        matches!(self, TcpState::Established)
    }

    /// Kernel name of the state (include/net/tcp_states.h)
    pub fn name(self) -> &'static str {
        match self.code() {
            0x01 => "ESTABLISHED",
            0x02 => "SYN_SENT",
            0x03 => "SYN_RECV",
            0x04 => "FIN_WAIT1",
            0x05 => "FIN_WAIT2",
            0x06 => "TIME_WAIT",
            0x07 => "CLOSE",
            0x08 => "CLOSE_WAIT",
            0x09 => "LAST_ACK",
            0x0A => "LISTEN",
            0x0B => "CLOSING",
            0x0C => "NEW_SYN_RECV",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded row of a connection table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpConnection {
    pub local_address: IpAddr,
    pub local_port: u16,
    pub remote_address: IpAddr,
    pub remote_port: u16,
    pub state: TcpState,
}

impl fmt::Display for TcpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            std::net::SocketAddr::new(self.local_address, self.local_port),
            std::net::SocketAddr::new(self.remote_address, self.remote_port),
            self.state
        )
    }
}

/// A kernel pseudo-file holding one family's connection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTableSource {
    pub path: PathBuf,
    pub family: AddressFamily,
}

impl ConnectionTableSource {
    pub fn new(path: impl Into<PathBuf>, family: AddressFamily) -> Self {
        Self {
            path: path.into(),
            family,
        }
    }

    /// `/proc/net/tcp`
    pub fn ipv4() -> Self {
        Self::new(PROC_NET_TCP, AddressFamily::V4)
    }

    /// `/proc/net/tcp6`
    pub fn ipv6() -> Self {
        Self::new(PROC_NET_TCP6, AddressFamily::V6)
    }
}
