//! Shared test harness for integration tests.
//!
//! Provides [`FakeHost`], an in-memory session source and command sink, and
//! [`TestHarness`], which wires it to a [`SkipEngine`] next to a temporary
//! media directory where EDL sidecars can be written.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::broadcast;

use edlskip::host::{
    CommandSink, HostError, PlaybackSession, SeekRequest, SessionId, SessionSource, UserId,
};
use edlskip::skip::SkipEngine;

/// In-memory stand-in for a media server.
pub struct FakeHost {
    sessions: Mutex<Vec<PlaybackSession>>,
    seeks: Mutex<Vec<SeekRequest>>,
    ended_tx: broadcast::Sender<SessionId>,
    listings: AtomicUsize,
    listing_delay: Mutex<Duration>,
    fail_listing: AtomicBool,
    reject_seeks: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Self {
        let (ended_tx, _) = broadcast::channel(16);
        Self {
            sessions: Mutex::new(Vec::new()),
            seeks: Mutex::new(Vec::new()),
            ended_tx,
            listings: AtomicUsize::new(0),
            listing_delay: Mutex::new(Duration::ZERO),
            fail_listing: AtomicBool::new(false),
            reject_seeks: AtomicBool::new(false),
        }
    }

    pub fn add_session(&self, session: PlaybackSession) {
        self.sessions.lock().push(session);
    }

    /// Move a session's playhead, as a client would after seeking.
    pub fn set_position(&self, id: &str, secs: u64) {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.iter_mut().find(|s| s.id.as_str() == id) {
            session.position = Some(Duration::from_secs(secs));
        }
    }

    /// Remove a session and notify subscribers.
    pub fn end_session(&self, id: &str) {
        self.sessions.lock().retain(|s| s.id.as_str() != id);
        let _ = self.ended_tx.send(SessionId::from(id));
    }

    /// Notify subscribers without touching the session list.
    pub fn notify_ended(&self, id: &str) {
        let _ = self.ended_tx.send(SessionId::from(id));
    }

    pub fn seeks(&self) -> Vec<SeekRequest> {
        self.seeks.lock().clone()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// Make every session listing take `delay`, like a slow server.
    pub fn set_listing_delay(&self, delay: Duration) {
        *self.listing_delay.lock() = delay;
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn reject_seeks(&self, reject: bool) {
        self.reject_seeks.store(reject, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SessionSource for FakeHost {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, HostError> {
        self.listings.fetch_add(1, Ordering::SeqCst);

        let delay = *self.listing_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(HostError::Request("listing disabled".to_string()));
        }
        Ok(self.sessions.lock().clone())
    }

    fn subscribe_ended(&self) -> broadcast::Receiver<SessionId> {
        self.ended_tx.subscribe()
    }
}

impl CommandSink for FakeHost {
    fn send_seek(&self, request: SeekRequest) -> Result<(), HostError> {
        if self.reject_seeks.load(Ordering::SeqCst) {
            return Err(HostError::ChannelClosed);
        }
        self.seeks.lock().push(request);
        Ok(())
    }
}

/// Build a playing session.
pub fn session(id: &str, media_path: &str, position_secs: u64) -> PlaybackSession {
    PlaybackSession {
        id: SessionId::from(id),
        user_id: UserId::new(format!("user-{id}")),
        media_path: Some(media_path.to_string()),
        position: Some(Duration::from_secs(position_secs)),
    }
}

/// Engine wired to a [`FakeHost`] plus a scratch media directory.
pub struct TestHarness {
    pub host: Arc<FakeHost>,
    pub engine: Arc<SkipEngine>,
    dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_reissue_after(None)
    }

    pub fn with_reissue_after(reissue_after: Option<Duration>) -> Self {
        let host = Arc::new(FakeHost::new());
        let engine = SkipEngine::new(host.clone(), host.clone()).with_reissue_after(reissue_after);
        let dir = tempfile::tempdir().expect("failed to create media dir");

        Self {
            host,
            engine: Arc::new(engine),
            dir,
        }
    }

    pub fn media_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a media file in the scratch dir. The media file itself is never
    /// created; only its sidecar matters.
    pub fn media_path(&self, file_name: &str) -> String {
        self.dir.path().join(file_name).to_string_lossy().into_owned()
    }

    /// Write the sidecar for `file_name` and return the media path.
    pub fn media_with_edl(&self, file_name: &str, edl: &str) -> String {
        let media = self.media_path(file_name);
        std::fs::write(edlskip_edl::resolve_edl_path(&media), edl).expect("failed to write EDL");
        media
    }

    pub fn edl_path(&self, file_name: &str) -> PathBuf {
        edlskip_edl::resolve_edl_path(&self.media_path(file_name))
    }
}
