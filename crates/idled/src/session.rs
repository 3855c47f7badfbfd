//! Login session probe (loginctl).

use serde::{Deserialize, Serialize};
use std::process::Command;
use tracing::{debug, warn};

/// How loginctl output is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCriterion {
    /// Any listed session counts
    #[default]
    NonEmpty,
    /// Only a session whose state column reads `active` counts
    ActiveMarker,
}

/// Asks systemd-logind for the current sessions
#[derive(Debug, Clone)]
pub struct SessionProbe {
    criterion: SessionCriterion,
    program: String,
}

impl SessionProbe {
    pub fn new(criterion: SessionCriterion) -> Self {
        Self {
            criterion,
            program: "loginctl".to_string(),
        }
    }

    /// Use a different binary in place of loginctl
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Whether any user session is active. Failing to ask counts as yes.
    pub fn is_any_user_active(&self) -> bool {
        let output = match Command::new(&self.program)
            .args(["list-sessions", "--no-legend"])
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Could not run {}: {}", self.program, e);
                return true;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{} list-sessions exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
            return true;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let active = sessions_indicate_activity(self.criterion, &stdout);
        debug!(
            "Sessions ({:?}): {} line(s), active={}",
            self.criterion,
            stdout.lines().filter(|l| !l.trim().is_empty()).count(),
            active
        );
        active
    }
}

/// Apply `criterion` to `loginctl list-sessions --no-legend` output
pub fn sessions_indicate_activity(criterion: SessionCriterion, output: &str) -> bool {
    match criterion {
        SessionCriterion::NonEmpty => !output.trim().is_empty(),
        SessionCriterion::ActiveMarker => output
            .lines()
            .any(|line| line.split_whitespace().any(|field| field == "active")),
    }
}
