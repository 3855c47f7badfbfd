//! Sentinel daemon main loop

use super::probe::{check, ActivityProbe};
use super::signals::ShutdownSignal;
use super::state::IdleTracker;
use super::types::{IdleVerdict, TickOutcome};
use crate::power::{PowerAction, PowerControl};
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Idle sentinel: one check per tick, power action after enough idle checks
pub struct Sentinel<P, C> {
    probe: P,
    power: C,
    action: PowerAction,
    tracker: IdleTracker,
    shutdown: ShutdownSignal,
}

impl<P: ActivityProbe, C: PowerControl> Sentinel<P, C> {
    pub fn new(probe: P, power: C, action: PowerAction, idle_checks: u32) -> Self {
        Self {
            probe,
            power,
            action,
            tracker: IdleTracker::new(idle_checks),
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Share a shutdown flag; a pending shutdown suppresses the power action
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Consecutive idle checks so far
    pub fn idle_count(&self) -> u32 {
        self.tracker.count()
    }

    /// Run one activity check and act on it
    pub fn tick(&mut self) -> TickOutcome {
        let report = check(&self.probe);

        match self.tracker.record(report.in_use) {
            IdleVerdict::Busy => {
                debug!("System is in use, skip {}", self.action);
                TickOutcome::InUse
            }
            IdleVerdict::Idle { count, required } => {
                debug!("System is inactive, counter={}/{}", count, required);
                TickOutcome::Idle { count, required }
            }
            IdleVerdict::PowerDue { count } => {
                if self.shutdown.is_requested() {
                    info!("Shutdown pending, not running {}", self.action);
                    return TickOutcome::Idle {
                        count,
                        required: self.tracker.required(),
                    };
                }

                info!(
                    "System inactive for {} consecutive checks, running {}",
                    count, self.action
                );
                match self.power.execute(self.action) {
                    Ok(()) => {
                        info!("{} finished, welcome back", self.action);
                        self.tracker.reset();
                        TickOutcome::PowerExecuted {
                            action: self.action,
                        }
                    }
                    Err(e) => {
                        error!("{} failed: {}", self.action, e);
                        TickOutcome::PowerFailed {
                            action: self.action,
                            error: e.to_string(),
                        }
                    }
                }
            }
        }
    }
}

impl<P, C> Sentinel<P, C>
where
    P: ActivityProbe + Send + 'static,
    C: PowerControl + Send + 'static,
{
    /// Tick every `period` (first check one period after start) until
    /// `shutdown` resolves. Checks run on the blocking pool.
    pub async fn run<F>(self, period: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut sentinel = self;
        let mut ticker = interval_at(Instant::now() + period, period);
        // a suspend stalls the clock; don't fire a burst of checks on resume
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Sentinel running (interval={}s, idle_checks={}, action={})",
            period.as_secs(),
            sentinel.tracker.required(),
            sentinel.action
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Sentinel stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let (returned, outcome) = tokio::task::spawn_blocking(move || {
                        let outcome = sentinel.tick();
                        (sentinel, outcome)
                    })
                    .await
                    .context("Activity check task failed")?;
                    sentinel = returned;

                    if let TickOutcome::PowerFailed { action, .. } = outcome {
                        warn!("Will retry {} on the next idle check", action);
                    }
                }
            }
        }
    }
}
