// src/main.rs

use axum::{Router, routing::get};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tutor_backend::api::ws_chat_handler;
use tutor_backend::config::TutorConfig;
use tutor_backend::prompt::PromptStore;
use tutor_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing credential halts startup here, not on the first turn.
    let config = TutorConfig::from_env()?;

    info!("Starting tutor backend");
    info!("Model: {}", config.model);
    info!(
        "History window: {}",
        if config.history_window == 0 {
            "full replay".to_string()
        } else {
            format!("last {} messages", config.history_window)
        }
    );

    // Validate the prompt file up front: bootstrap the default when absent,
    // fail fast when it exists but cannot be read.
    let prompts = PromptStore::new(config.prompt_path.clone());
    let prompt = prompts.load().await?;
    info!(
        "System prompt loaded from {} ({} chars)",
        prompts.path().display(),
        prompt.len()
    );

    let bind_address = config.bind_address();
    let state = AppState::new(config);

    let app = Router::new()
        .route("/ws", get(ws_chat_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Chat endpoint listening on ws://{}/ws", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
