use super::{CommandSink, HostError, PlaybackSession, SeekRequest, SessionId, SessionSource, UserId};
use crate::config::JellyfinConfig;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Jellyfin position ticks are 100 ns units.
const TICKS_PER_SECOND: u64 = 10_000_000;
const NANOS_PER_TICK: u64 = 100;

const ENDED_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SessionInfoDto {
    id: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    now_playing_item: Option<NowPlayingItemDto>,
    #[serde(default)]
    play_state: Option<PlayStateDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NowPlayingItemDto {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlayStateDto {
    #[serde(default)]
    position_ticks: Option<i64>,
}

impl From<SessionInfoDto> for PlaybackSession {
    fn from(dto: SessionInfoDto) -> Self {
        Self {
            id: SessionId::new(dto.id),
            user_id: UserId::new(dto.user_id.unwrap_or_default()),
            media_path: dto
                .now_playing_item
                .and_then(|item| item.path)
                .filter(|path| !path.is_empty()),
            position: dto
                .play_state
                .and_then(|state| state.position_ticks)
                .map(ticks_to_duration),
        }
    }
}

fn ticks_to_duration(ticks: i64) -> Duration {
    let ticks = ticks.max(0) as u64;
    Duration::from_secs(ticks / TICKS_PER_SECOND)
        + Duration::from_nanos((ticks % TICKS_PER_SECOND) * NANOS_PER_TICK)
}

fn duration_to_ticks(duration: Duration) -> u64 {
    duration
        .as_secs()
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(u64::from(duration.subsec_nanos()) / NANOS_PER_TICK)
}

/// Session source and command sink backed by Jellyfin's HTTP API.
///
/// Jellyfin has no push channel over plain HTTP, so session ends are derived
/// by diffing consecutive `/Sessions` snapshots. Seeks are queued and posted
/// by a background worker so a slow server never stalls a scan.
pub struct JellyfinHost {
    client: Client,
    base_url: String,
    api_key: String,
    known_sessions: Mutex<HashSet<SessionId>>,
    ended_tx: broadcast::Sender<SessionId>,
    seek_tx: mpsc::UnboundedSender<SeekRequest>,
}

impl JellyfinHost {
    /// Create the adapter and spawn its seek delivery worker.
    ///
    /// Must be called from within a tokio runtime. The worker exits when the
    /// host is dropped.
    pub fn new(config: &JellyfinConfig) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        let base_url = config.url.trim_end_matches('/').to_string();
        let (ended_tx, _) = broadcast::channel(ENDED_CHANNEL_CAPACITY);
        let (seek_tx, seek_rx) = mpsc::unbounded_channel();

        tokio::spawn(deliver_seeks(
            client.clone(),
            base_url.clone(),
            config.api_key.clone(),
            seek_rx,
        ));

        Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            known_sessions: Mutex::new(HashSet::new()),
            ended_tx,
            seek_tx,
        }
    }

    /// Test connectivity to Jellyfin
    pub async fn test_connection(&self) -> Result<bool, HostError> {
        let url = format!("{}/System/Info", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-Emby-Token", &self.api_key)
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// Record the current snapshot and broadcast sessions that disappeared.
    fn track_snapshot(&self, sessions: &[PlaybackSession]) {
        let current: HashSet<SessionId> = sessions.iter().map(|s| s.id.clone()).collect();

        let ended: Vec<SessionId> = {
            let mut known = self.known_sessions.lock();
            let ended = known.difference(&current).cloned().collect();
            *known = current;
            ended
        };

        for id in ended {
            tracing::debug!(session_id = %id, "Jellyfin session no longer reported");
            // No receivers just means nobody is listening yet
            let _ = self.ended_tx.send(id);
        }
    }
}

#[async_trait::async_trait]
impl SessionSource for JellyfinHost {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, HostError> {
        let url = format!("{}/Sessions", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-Emby-Token", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Request(format!(
                "Jellyfin session listing failed ({}): {}",
                status, body
            )));
        }

        let dtos: Vec<SessionInfoDto> = response.json().await?;
        let sessions: Vec<PlaybackSession> = dtos.into_iter().map(PlaybackSession::from).collect();

        self.track_snapshot(&sessions);
        Ok(sessions)
    }

    fn subscribe_ended(&self) -> broadcast::Receiver<SessionId> {
        self.ended_tx.subscribe()
    }
}

impl CommandSink for JellyfinHost {
    fn send_seek(&self, request: SeekRequest) -> Result<(), HostError> {
        self.seek_tx
            .send(request)
            .map_err(|_| HostError::ChannelClosed)
    }
}

async fn deliver_seeks(
    client: Client,
    base_url: String,
    api_key: String,
    mut seek_rx: mpsc::UnboundedReceiver<SeekRequest>,
) {
    while let Some(request) = seek_rx.recv().await {
        let url = format!("{}/Sessions/{}/Playing/Seek", base_url, request.session_id);
        let ticks = duration_to_ticks(request.target);

        let result = client
            .post(&url)
            .header("X-Emby-Token", &api_key)
            .query(&[
                ("seekPositionTicks", ticks.to_string()),
                ("controllingUserId", request.controlling_user.to_string()),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(
                    session_id = %request.session_id,
                    target_secs = request.target.as_secs(),
                    "Seek delivered"
                );
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    session_id = %request.session_id,
                    "Jellyfin rejected seek ({}): {}",
                    status,
                    body
                );
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %request.session_id,
                    "Failed to deliver seek: {}",
                    e
                );
            }
        }
    }

    tracing::debug!("Seek delivery worker stopped");
}
