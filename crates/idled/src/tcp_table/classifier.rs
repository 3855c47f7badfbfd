//! Activity classifier: scans the IPv4 table, then the IPv6 table.

use super::decode::decode_row;
use super::policy::ActivityPolicy;
use super::reader::TableSource;
use super::types::TcpConnection;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Outcome of one scan over the connection tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum NetworkVerdict {
    /// A connection qualified under the policy
    Active {
        table: PathBuf,
        connection: TcpConnection,
    },
    /// Both tables scanned, nothing qualified
    Idle,
    /// A table could not be read; treated as active
    Unobservable { table: PathBuf, error: String },
}

impl NetworkVerdict {
    /// Active and unobservable both count as "in use"
    pub fn is_active(&self) -> bool {
        !matches!(self, NetworkVerdict::Idle)
    }
}

/// Whether the tables show a connection that counts as real use.
///
/// Unreadable tables yield `true`.
pub fn is_network_active(
    source_v4: &dyn TableSource,
    source_v6: &dyn TableSource,
    policy: &ActivityPolicy,
) -> bool {
    scan_tables(&[source_v4, source_v6], policy).is_active()
}

/// Scan `sources` in order and stop at the first qualifying connection or
/// the first table that cannot be read.
pub fn scan_tables(sources: &[&dyn TableSource], policy: &ActivityPolicy) -> NetworkVerdict {
    for source in sources {
        let verdict = scan_table(*source, policy);
        if verdict.is_active() {
            return verdict;
        }
    }
    NetworkVerdict::Idle
}

fn scan_table(source: &dyn TableSource, policy: &ActivityPolicy) -> NetworkVerdict {
    let table = source.origin().to_path_buf();

    let rows = match source.open() {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Could not open connection table: {}", e);
            return NetworkVerdict::Unobservable {
                table,
                error: e.to_string(),
            };
        }
    };

    let mut scanned = 0usize;
    let mut skipped = 0usize;

    for row in rows {
        let line = match row {
            Ok(line) => line,
            Err(e) => {
                warn!("Read of connection table failed: {}", e);
                return NetworkVerdict::Unobservable {
                    table,
                    error: e.to_string(),
                };
            }
        };

        scanned += 1;
        let connection = match decode_row(&line, source.family()) {
            Ok(connection) => connection,
            Err(e) => {
                skipped += 1;
                debug!("Skipping row '{}' in {}: {}", line, table.display(), e);
                continue;
            }
        };

        trace!("{}: {}", table.display(), connection);
        if policy.is_active(&connection) {
            debug!("Active connection in {}: {}", table.display(), connection);
            return NetworkVerdict::Active { table, connection };
        }
    }

    debug!(
        "{}: {} rows scanned, {} skipped, no qualifying connection",
        table.display(),
        scanned,
        skipped
    );
    NetworkVerdict::Idle
}
