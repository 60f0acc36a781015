//! Skip detection and playback control.
//!
//! One [`SkipEngine::scan`] walks every active session: it resolves the
//! session's sidecar EDL, re-reads it, finds the first range containing the
//! current position and asks the host to seek to that range's end. A
//! [`SkipTracker`] marker per session allows one seek per range until the
//! position leaves it, the media changes or the session ends.

pub mod tracker;

pub use tracker::{SkipMarker, SkipTracker};

use crate::host::{CommandSink, HostError, PlaybackSession, SeekRequest, SessionId, SessionSource};
use edlskip_edl::{find_active_range, parse_edl_read, resolve_edl_path, SkipRange};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What happened to one session during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Nothing playing, or no position reported.
    Idle,
    /// No sidecar, or a sidecar without valid lines.
    NoRanges,
    /// The sidecar could not be read; treated as no ranges.
    Unreadable,
    /// Position is outside every range.
    Outside,
    /// A seek past the range was queued.
    Seeked(SkipRange),
    /// The range was already actioned during this visit.
    Suppressed(SkipRange),
    /// The seek could not be queued.
    SeekFailed(SkipRange),
}

/// Counters for one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub sessions: usize,
    pub seeks: usize,
    pub suppressed: usize,
    pub failures: usize,
}

impl ScanSummary {
    fn record(&mut self, outcome: &SkipOutcome) {
        self.sessions += 1;
        match outcome {
            SkipOutcome::Seeked(_) => self.seeks += 1,
            SkipOutcome::Suppressed(_) => self.suppressed += 1,
            SkipOutcome::Unreadable | SkipOutcome::SeekFailed(_) => self.failures += 1,
            SkipOutcome::Idle | SkipOutcome::NoRanges | SkipOutcome::Outside => {}
        }
    }
}

pub struct SkipEngine {
    source: Arc<dyn SessionSource>,
    sink: Arc<dyn CommandSink>,
    tracker: SkipTracker,
    reissue_after: Option<Duration>,
}

impl SkipEngine {
    pub fn new(source: Arc<dyn SessionSource>, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            source,
            sink,
            tracker: SkipTracker::new(),
            reissue_after: None,
        }
    }

    /// Seek again when a session is still inside an actioned range after
    /// `reissue_after`. `None` (the default) never re-issues.
    pub fn with_reissue_after(mut self, reissue_after: Option<Duration>) -> Self {
        self.reissue_after = reissue_after;
        self
    }

    pub fn tracker(&self) -> &SkipTracker {
        &self.tracker
    }

    pub fn source(&self) -> &Arc<dyn SessionSource> {
        &self.source
    }

    /// Run one pass over every active session.
    ///
    /// Only a failure to list sessions is returned; everything that goes wrong
    /// for a single session is logged and the pass moves on.
    pub async fn scan(&self) -> Result<ScanSummary, HostError> {
        let sessions = self.source.sessions().await?;
        let now = Instant::now();

        let mut summary = ScanSummary::default();
        for session in &sessions {
            let outcome = self.process_session(session, now).await;
            tracing::trace!(session_id = %session.id, ?outcome, "Session evaluated");
            summary.record(&outcome);
        }

        Ok(summary)
    }

    /// Evaluate one session and issue a seek if it sits inside a skip range.
    pub async fn process_session(&self, session: &PlaybackSession, now: Instant) -> SkipOutcome {
        let (Some(media_path), Some(position)) = (session.media_path.as_deref(), session.position)
        else {
            return SkipOutcome::Idle;
        };

        let edl_path = resolve_edl_path(media_path);
        let read = tokio::fs::read(&edl_path).await;
        let ranges = match parse_edl_read(&edl_path, read) {
            Ok(ranges) => ranges,
            Err(e) => {
                tracing::warn!(session_id = %session.id, "Ignoring unreadable EDL: {}", e);
                self.tracker.release(&session.id);
                return SkipOutcome::Unreadable;
            }
        };

        if ranges.is_empty() {
            self.tracker.release(&session.id);
            return SkipOutcome::NoRanges;
        }

        let Some(range) = find_active_range(&ranges, position).copied() else {
            if self.tracker.release(&session.id) {
                tracing::debug!(session_id = %session.id, "Left skip range, marker cleared");
            }
            return SkipOutcome::Outside;
        };

        if !self
            .tracker
            .try_claim(&session.id, media_path, range, now, self.reissue_after)
        {
            return SkipOutcome::Suppressed(range);
        }

        tracing::info!(
            session_id = %session.id,
            start = range.start.as_secs(),
            end = range.end.as_secs(),
            "Skipping from {} to {}",
            range.start.as_secs(),
            range.end.as_secs()
        );

        let request = SeekRequest {
            session_id: session.id.clone(),
            controlling_user: session.user_id.clone(),
            target: range.end,
        };

        match self.sink.send_seek(request) {
            Ok(()) => SkipOutcome::Seeked(range),
            Err(e) => {
                tracing::warn!(session_id = %session.id, "Failed to issue seek: {}", e);
                self.tracker.release_claim(&session.id, &range);
                SkipOutcome::SeekFailed(range)
            }
        }
    }

    /// Clear all skip state for a session the host reported as ended.
    pub fn session_ended(&self, session_id: &SessionId) -> bool {
        let cleared = self.tracker.forget(session_id);
        if cleared {
            tracing::info!(session_id = %session_id, "Session ended: cleared skip state");
        }
        cleared
    }
}
