#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use miku_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use miku_history::SqliteHistory;
use miku_llm::{ChatMessage, GenerationParams, LanguageModel, LlmError};
use miku_server::{app, AppState};
use miku_turn::TurnOrchestrator;
use miku_types::UserId;
use miku_voice::{LiveKitConfig, SpeechSynthesizer, VoiceError, VoiceParams, VoiceService};
use std::sync::{Arc, Mutex};

pub const LIVEKIT_SECRET: &str = "test-secret-that-is-long-enough";

/// Model that replays a fixed answer and records what it was sent.
pub struct StubModel {
    pub reply: Result<String, u16>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(LlmError::Status {
                status: *status,
                body: "provider rejected the request".to_string(),
            }),
        }
    }
}

/// Synthesizer returning fixed bytes, or failing when `audio` is `None`.
pub struct StubSynth {
    pub audio: Option<Vec<u8>>,
}

#[async_trait]
impl SpeechSynthesizer for StubSynth {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceParams,
    ) -> Result<Option<Vec<u8>>, VoiceError> {
        match &self.audio {
            Some(bytes) => Ok(Some(bytes.clone())),
            None => Err(VoiceError::Tts("TTS provider returned 500".to_string())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    _dir: tempfile::TempDir,
}

pub struct TestAppBuilder {
    model: Arc<StubModel>,
    synth: StubSynth,
    livekit: LiveKitConfig,
    static_dir: Option<std::path::PathBuf>,
    index_path: Option<std::path::PathBuf>,
}

impl TestAppBuilder {
    pub fn new(model: Arc<StubModel>) -> Self {
        Self {
            model,
            synth: StubSynth {
                audio: Some(b"ID3-fake-mp3".to_vec()),
            },
            livekit: LiveKitConfig::new("wss://miku.example.test", "devkey", LIVEKIT_SECRET),
            static_dir: None,
            index_path: None,
        }
    }

    pub fn failing_synth(mut self) -> Self {
        self.synth = StubSynth { audio: None };
        self
    }

    pub fn livekit(mut self, config: LiveKitConfig) -> Self {
        self.livekit = config;
        self
    }

    pub fn static_files(mut self, dir: std::path::PathBuf, index: std::path::PathBuf) -> Self {
        self.static_dir = Some(dir);
        self.index_path = Some(index);
        self
    }

    pub fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miku.db");
        let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            run_migrations(&conn).unwrap();
        }

        let history = Arc::new(SqliteHistory::new(pool.clone()));
        let turns = TurnOrchestrator::new(history.clone(), self.model, Arc::new(self.synth));
        let missing = dir.path().join("missing");

        let state = AppState {
            turns,
            history,
            voice_service: Arc::new(VoiceService::new(self.livekit)),
            default_user_id: UserId(1),
            static_dir: path_string(self.static_dir.unwrap_or_else(|| missing.clone())),
            index_path: path_string(self.index_path.unwrap_or(missing)),
        };

        TestApp {
            router: app(state),
            pool,
            _dir: dir,
        }
    }
}

fn path_string(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

pub fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn message_rows(pool: &DbPool) -> Vec<(String, String)> {
    let conn = pool.get().unwrap();
    let mut stmt = conn
        .prepare("SELECT role, content FROM messages ORDER BY id")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}
