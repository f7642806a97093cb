//! Miku server binary.
//!
//! `miku-server [config]` serves the HTTP API; `miku-server agent [config]`
//! runs the realtime room agent. Both shut down gracefully on SIGTERM/SIGINT.

use miku_history::SqliteHistory;
use miku_llm::OpenAiCompatClient;
use miku_server::config::{self, Config};
use miku_server::{app, AppState};
use miku_turn::TurnOrchestrator;
use miku_voice::{GoogleTts, RoomAgent, VoiceService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Agent,
}

fn resolve_mode(args: &[String]) -> (Mode, Option<String>) {
    let (mode, rest) = match args.first().map(String::as_str) {
        Some("agent") => (Mode::Agent, &args[1..]),
        _ => (Mode::Serve, args),
    };
    let path = rest.first().filter(|value| !value.trim().is_empty()).cloned();
    (mode, path)
}

fn resolve_config_path(cli_path: Option<String>) -> (Option<String>, &'static str) {
    if let Some(path) = cli_path {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("MIKU_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, cli_path) = resolve_mode(&args);
    let (resolved_config_path, config_source) = resolve_config_path(cli_path);
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration; the server cannot start without valid config");

    // Initialize tracing. The guard flushes buffered logs on exit.
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        mode = ?mode,
        "resolved startup configuration path"
    );

    match mode {
        Mode::Serve => serve(config).await,
        Mode::Agent => run_agent(config).await,
    }
}

async fn serve(config: Config) {
    // Initialize database
    let pool = miku_db::create_pool(
        &config.database.path,
        miku_db::DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to create database pool; check database.path in config");

    {
        let conn = pool
            .get()
            .expect("failed to get database connection for migrations");
        let applied = miku_db::run_migrations(&conn).expect("failed to run database migrations");
        if applied > 0 {
            tracing::info!(count = applied, "applied database migrations");
        }
    }

    let model = OpenAiCompatClient::new(config.llm.client_config())
        .expect("failed to build language model client");
    if !model.is_configured() {
        tracing::warn!("llm.api_key is not set; every chat turn will fail until it is");
    }

    let tts = GoogleTts::new(&config.speech).expect("failed to build speech client");
    if !tts.is_enabled() {
        tracing::warn!("speech.api_key is not set; replies will have no audio");
    }

    let voice_service = Arc::new(VoiceService::new(config.livekit.clone()));
    if !voice_service.is_enabled() {
        tracing::warn!("livekit credentials are not set; /token will return 503");
    }

    let history = Arc::new(SqliteHistory::new(pool));
    let turns = TurnOrchestrator::new(history.clone(), Arc::new(model), Arc::new(tts))
        .with_generation_params(config.llm.generation_params())
        .with_voice(config.speech.voice.clone());

    let state = AppState {
        turns,
        history,
        voice_service,
        default_user_id: config.server.default_user_id,
        static_dir: config.server.static_dir.clone(),
        index_path: config.server.index_path.clone(),
    };

    // Build application
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting miku server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address; is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("miku server shut down");
}

async fn run_agent(config: Config) {
    let voice_service = Arc::new(VoiceService::new(config.livekit.clone()));
    let agent = RoomAgent::new(voice_service, config.livekit.room.clone());

    match agent.join().await {
        Ok(session) => session.run_until(shutdown_signal()).await,
        Err(e) => tracing::error!(error = %e, "agent failed to join room"),
    }
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
