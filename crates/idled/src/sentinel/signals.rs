// Shutdown signal handling (SIGINT / SIGTERM)

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::info;

/// Shared flag set once a shutdown signal has arrived
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }
}

/// Registered SIGINT/SIGTERM handlers
pub struct ShutdownListener {
    sigterm: Signal,
    sigint: Signal,
    flag: ShutdownSignal,
}

impl ShutdownListener {
    /// Install the handlers. Must run inside a tokio runtime.
    pub fn register(flag: ShutdownSignal) -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
        let sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
        info!("Signal handlers registered (SIGINT, SIGTERM)");
        Ok(Self {
            sigterm,
            sigint,
            flag,
        })
    }

    /// Resolve once a shutdown signal arrives; returns the signal name
    pub async fn recv(mut self) -> &'static str {
        let name = tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        };

        info!("{} received, shutting down", name);
        self.flag.request();
        name
    }
}
