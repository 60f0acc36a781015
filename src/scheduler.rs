//! Fixed-interval driver for the skip engine.
//!
//! Two tasks run while started: the scan loop, which awaits each scan before
//! waiting for the next tick so passes never overlap, and the session-end
//! listener, which clears skip state as sessions finish.

use crate::host::SessionId;
use crate::skip::SkipEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default scan period.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(100);

struct Running {
    shutdown_tx: watch::Sender<bool>,
    scan_handle: JoinHandle<()>,
    ended_handle: JoinHandle<()>,
}

pub struct PollScheduler {
    engine: Arc<SkipEngine>,
    interval: Duration,
    running: Option<Running>,
}

impl PollScheduler {
    /// A zero `interval` falls back to [`DEFAULT_SCAN_INTERVAL`].
    pub fn new(engine: Arc<SkipEngine>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                default_ms = DEFAULT_SCAN_INTERVAL.as_millis() as u64,
                "Scan interval of 0 ms is not allowed, using default"
            );
            DEFAULT_SCAN_INTERVAL
        } else {
            interval
        };

        Self {
            engine,
            interval,
            running: None,
        }
    }

    pub fn engine(&self) -> &Arc<SkipEngine> {
        &self.engine
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start scanning. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.running.is_some() {
            tracing::warn!("Skip scheduler already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Subscribe before spawning so no end notification slips through
        let ended_rx = self.engine.source().subscribe_ended();
        let ended_handle = tokio::spawn(run_session_ends(
            self.engine.clone(),
            ended_rx,
            shutdown_rx.clone(),
        ));

        let scan_handle = tokio::spawn(run_scans(self.engine.clone(), self.interval, shutdown_rx));

        self.running = Some(Running {
            shutdown_tx,
            scan_handle,
            ended_handle,
        });

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Skip scheduler started");
    }

    /// Stop scanning. A scan already in progress runs to completion first.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        tracing::info!("Skip scheduler stopping");
        let _ = running.shutdown_tx.send(true);

        if let Err(e) = running.scan_handle.await {
            tracing::error!("Scan task failed: {}", e);
        }
        if let Err(e) = running.ended_handle.await {
            tracing::error!("Session-end listener failed: {}", e);
        }

        tracing::info!("Skip scheduler stopped");
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(true);
        }
    }
}

async fn run_scans(engine: Arc<SkipEngine>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break,
            _ = interval.tick() => {}
        }

        match engine.scan().await {
            Ok(summary) if summary.seeks > 0 || summary.failures > 0 => {
                tracing::debug!(
                    sessions = summary.sessions,
                    seeks = summary.seeks,
                    suppressed = summary.suppressed,
                    failures = summary.failures,
                    "Scan complete"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to list sessions: {}", e);
            }
        }
    }

    tracing::debug!("Scan loop exited");
}

async fn run_session_ends(
    engine: Arc<SkipEngine>,
    mut ended_rx: broadcast::Receiver<SessionId>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break,
            received = ended_rx.recv() => match received {
                Ok(session_id) => {
                    engine.session_ended(&session_id);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Missed session-end notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    tracing::debug!("Session-end listener exited");
}
