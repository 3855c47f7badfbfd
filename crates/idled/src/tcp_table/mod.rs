//! TCP connection-table inspector
//!
//! Reads the kernel's textual TCP tables (`/proc/net/tcp`, `/proc/net/tcp6`)
//! and decides whether they hold a connection that counts as real use of
//! the machine.
//!
//! # Layers
//!
//! - [`reader`]: opens a table, yields trimmed data rows
//! - [`decode`]: hex rows into [`TcpConnection`] records
//! - [`policy`]: which established connections count
//! - [`classifier`]: IPv4 then IPv6, first match wins, unreadable means active

pub mod classifier;
pub mod decode;
pub mod policy;
pub mod reader;
pub mod types;

pub use classifier::{is_network_active, scan_tables, NetworkVerdict};
pub use decode::{decode_address, decode_endpoint, decode_port, decode_row, decode_state};
pub use policy::ActivityPolicy;
pub use reader::{TableReader, TableSource};
pub use types::{
    AddressFamily, ConnectionTableSource, TcpConnection, TcpState, PROC_NET_TCP, PROC_NET_TCP6,
};
