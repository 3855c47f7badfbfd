//! Sentinel: the idle loop around the activity checks
//!
//! Every tick runs one check (connection tables first, login sessions only
//! when the network looks idle), feeds the consecutive-idle counter and runs
//! the configured power action once the counter reaches its threshold.
//!
//! ```text
//!   tick ──► ActivityProbe ──► IdleTracker ──► PowerControl
//!              │  network            │ busy: reset
//!              │  sessions           │ idle: count
//!              ▼                     ▼ due:  suspend / poweroff
//!          CheckReport           TickOutcome
//! ```
//!
//! Any failure to observe the machine counts as "in use". Failures inside a
//! tick are logged and never end the loop.

pub mod daemon;
pub mod probe;
pub mod signals;
pub mod state;
pub mod types;

pub use daemon::Sentinel;
pub use probe::{check, ActivityProbe, SystemProbe};
pub use signals::{ShutdownListener, ShutdownSignal};
pub use state::IdleTracker;
pub use types::{CheckReport, IdleVerdict, NetworkStatus, TickOutcome};
