//! Per-session record of the last skip that was actioned.
//!
//! Written from two places: the scan loop claims a marker before issuing a
//! seek, and the session-end listener forgets markers of finished sessions.
//! All access goes through one mutex and never holds it across an await.

use crate::host::SessionId;
use edlskip_edl::SkipRange;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// The last range a seek was issued for in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipMarker {
    pub media_path: String,
    pub range: SkipRange,
    pub issued_at: Instant,
}

impl SkipMarker {
    fn covers(&self, media_path: &str, range: &SkipRange) -> bool {
        self.media_path == media_path && self.range == *range
    }
}

/// Thread-safe table of skip markers keyed by session.
#[derive(Debug, Clone, Default)]
pub struct SkipTracker {
    markers: Arc<Mutex<HashMap<SessionId, SkipMarker>>>,
}

impl SkipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to seek past `range` in this session.
    ///
    /// Fails while the session already holds a marker for the same media and
    /// range. With `reissue_after` set, a marker older than that delay no
    /// longer blocks. A successful claim replaces any previous marker.
    pub fn try_claim(
        &self,
        session_id: &SessionId,
        media_path: &str,
        range: SkipRange,
        now: Instant,
        reissue_after: Option<Duration>,
    ) -> bool {
        let mut markers = self.markers.lock();

        if let Some(marker) = markers.get(session_id) {
            let expired = reissue_after
                .is_some_and(|delay| now.saturating_duration_since(marker.issued_at) >= delay);
            if marker.covers(media_path, &range) && !expired {
                return false;
            }
        }

        markers.insert(
            session_id.clone(),
            SkipMarker {
                media_path: media_path.to_string(),
                range,
                issued_at: now,
            },
        );
        true
    }

    /// Drop the marker of a session whose position left every range.
    pub fn release(&self, session_id: &SessionId) -> bool {
        self.markers.lock().remove(session_id).is_some()
    }

    /// Undo a claim for `range`, leaving newer markers alone.
    pub fn release_claim(&self, session_id: &SessionId, range: &SkipRange) {
        let mut markers = self.markers.lock();
        if markers
            .get(session_id)
            .is_some_and(|marker| marker.range == *range)
        {
            markers.remove(session_id);
        }
    }

    /// Remove all state for an ended session.
    pub fn forget(&self, session_id: &SessionId) -> bool {
        self.release(session_id)
    }

    pub fn marker(&self, session_id: &SessionId) -> Option<SkipMarker> {
        self.markers.lock().get(session_id).cloned()
    }

    pub fn is_tracked(&self, session_id: &SessionId) -> bool {
        self.markers.lock().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.markers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.lock().is_empty()
    }
}
