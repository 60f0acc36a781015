//! Boundary to the media server that owns playback sessions.
//!
//! The skip engine never talks to a server directly. It reads session
//! snapshots from a [`SessionSource`] and hands seek requests to a
//! [`CommandSink`]. [`JellyfinHost`] implements both over HTTP.

pub mod jellyfin;

pub use jellyfin::JellyfinHost;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Opaque identifier of a playback session, as issued by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of the user owning a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of an active session at the time of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub user_id: UserId,
    /// Path of the item being played, if any.
    pub media_path: Option<String>,
    /// Current position from the start of the media. `None` when the host
    /// reports no play state.
    pub position: Option<Duration>,
}

/// A request to move a session's playhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekRequest {
    pub session_id: SessionId,
    /// User the command is issued on behalf of.
    pub controlling_user: UserId,
    pub target: Duration,
}

/// Errors raised at the host boundary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host could not be reached or answered with a failure.
    #[error("Host request failed: {0}")]
    Request(String),

    /// The host answered with data we could not understand.
    #[error("Invalid host response: {0}")]
    InvalidResponse(String),

    /// The command could not be queued for delivery.
    #[error("Command channel closed")]
    ChannelClosed,
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Supplies snapshots of the active sessions and session-end notifications.
#[async_trait::async_trait]
pub trait SessionSource: Send + Sync {
    /// Snapshot of all sessions at this instant.
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, HostError>;

    /// Subscribe to the ids of sessions as they end.
    fn subscribe_ended(&self) -> broadcast::Receiver<SessionId>;
}

/// Accepts seek commands for delivery to clients.
///
/// Delivery is asynchronous: `Ok` means the request was queued, not that the
/// client applied it.
pub trait CommandSink: Send + Sync {
    fn send_seek(&self, request: SeekRequest) -> Result<(), HostError>;
}
