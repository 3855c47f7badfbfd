//! Power-state transitions via systemctl.

use crate::error::{Result, SentinelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use tracing::{info, warn};

/// What to do once the machine has been idle long enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    #[default]
    Suspend,
    Poweroff,
}

impl PowerAction {
    /// systemctl verb for this action
    pub fn verb(self) -> &'static str {
        match self {
            PowerAction::Suspend => "suspend",
            PowerAction::Poweroff => "poweroff",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Performs power actions
pub trait PowerControl {
    /// Run `action`. Returns once the machine is back (suspend) or the
    /// request was accepted.
    fn execute(&self, action: PowerAction) -> Result<()>;
}

impl<T: PowerControl + ?Sized> PowerControl for Box<T> {
    fn execute(&self, action: PowerAction) -> Result<()> {
        (**self).execute(action)
    }
}

/// `systemctl suspend` / `systemctl poweroff`
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
}

impl Systemctl {
    pub fn new() -> Self {
        Self {
            program: "systemctl".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerControl for Systemctl {
    fn execute(&self, action: PowerAction) -> Result<()> {
        let command = format!("{} {}", self.program, action.verb());
        info!("Executing '{}'", command);

        let output = Command::new(&self.program)
            .arg(action.verb())
            .output()
            .map_err(|e| SentinelError::Command {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("already in progress") {
            warn!("'{}': {} already in progress", command, action);
            return Ok(());
        }

        Err(SentinelError::Command {
            command,
            reason: format!("{}: {}", output.status, stderr.trim()),
        })
    }
}

/// Logs the action instead of performing it
#[derive(Debug, Clone, Default)]
pub struct DryRun;

impl PowerControl for DryRun {
    fn execute(&self, action: PowerAction) -> Result<()> {
        info!("[dry-run] would run 'systemctl {}'", action.verb());
        Ok(())
    }
}
