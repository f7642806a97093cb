use crate::error::VoiceError;
use crate::service::VoiceService;
use livekit_protocol::TrackType;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Identity the assistant joins its room with.
pub const AGENT_IDENTITY: &str = "miku-bot";

/// Display name the assistant joins its room with.
pub const AGENT_DISPLAY_NAME: &str = "Miku AI";

/// Interval between keep-alive heartbeats while the session is running.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// The assistant's presence in its LiveKit room.
///
/// This is a contract stub: it issues its own credential and holds a session
/// handle, but carries no media transport. Subscribed audio tracks are
/// acknowledged and dropped because speech-to-text is not wired.
#[derive(Debug)]
pub struct RoomAgent {
    voice: Arc<VoiceService>,
    room_name: String,
}

/// Handle for a joined room session.
#[derive(Debug)]
pub struct AgentSession {
    pub room_url: String,
    pub room_name: String,
    pub token: String,
    connected: bool,
}

impl RoomAgent {
    pub fn new(voice: Arc<VoiceService>, room_name: impl Into<String>) -> Self {
        Self {
            voice,
            room_name: room_name.into(),
        }
    }

    /// Issues the agent's credential and joins the room.
    ///
    /// Creating the room on the LiveKit server is best effort; LiveKit also
    /// creates rooms on first join.
    pub async fn join(&self) -> Result<AgentSession, VoiceError> {
        let token =
            self.voice
                .issue_credential(AGENT_IDENTITY, AGENT_DISPLAY_NAME, &self.room_name)?;

        if let Err(e) = self.voice.ensure_room(&self.room_name).await {
            warn!(room = %self.room_name, error = %e, "could not pre-create room");
        }

        info!(
            room = %self.room_name,
            url = %self.voice.get_url(),
            token_len = token.len(),
            "agent joined room"
        );

        Ok(AgentSession {
            room_url: self.voice.get_url().to_string(),
            room_name: self.room_name.clone(),
            token,
            connected: true,
        })
    }
}

impl AgentSession {
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Handles a newly subscribed remote track.
    ///
    /// Returns `true` if the track would be routed to transcription.
    pub fn on_track_subscribed(&self, participant: &str, kind: TrackType) -> bool {
        match kind {
            TrackType::Audio => {
                info!(
                    room = %self.room_name,
                    participant,
                    "audio track subscribed; transcription is not wired, dropping frames"
                );
                true
            }
            other => {
                info!(room = %self.room_name, participant, kind = ?other, "ignoring non-audio track");
                false
            }
        }
    }

    /// Handles a data packet published by a participant.
    pub fn on_data_received(&self, participant: &str, payload: &[u8]) {
        info!(
            room = %self.room_name,
            participant,
            bytes = payload.len(),
            "data packet received"
        );
    }

    /// Keeps the session alive until `shutdown` resolves.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = heartbeat.tick() => {
                    tracing::trace!(room = %self.room_name, "agent heartbeat");
                }
            }
        }

        self.connected = false;
        info!(room = %self.room_name, "agent left room");
    }
}
