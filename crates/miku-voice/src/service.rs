use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use livekit_protocol::Room;
use std::time::Duration;

/// Issues LiveKit credentials for the assistant room.
#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
    room_client: RoomClient,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client =
            RoomClient::with_api_key(&config.url, &config.api_key, &config.api_secret);
        Self {
            config,
            room_client,
        }
    }

    /// Returns `true` when both signing credentials are configured.
    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.api_secret.is_empty()
    }

    /// Returns the LiveKit server URL handed to clients.
    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Returns the room granted by issued tokens.
    pub fn room(&self) -> &str {
        &self.config.room
    }

    /// Signs a join token for `room_name`.
    ///
    /// The participant's identity and display name are taken verbatim; the
    /// caller is not authenticated.
    pub fn issue_credential(
        &self,
        participant_identity: &str,
        participant_name: &str,
        room_name: &str,
    ) -> Result<String, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Config(
                "LiveKit api_key and api_secret must be set to issue tokens".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    /// Creates `name` on the LiveKit server if it does not already exist.
    pub async fn ensure_room(&self, name: &str) -> Result<Room, VoiceError> {
        let options = CreateRoomOptions::default();

        self.room_client
            .create_room(name, options)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }
}
