// src/state.rs
// Shared, read-only service wiring handed to every connection. Per-session
// mutable state lives in SessionState, owned by each connection task.

use std::sync::Arc;

use crate::chat::{ChatService, window};
use crate::config::TutorConfig;
use crate::ingest::Ingestor;
use crate::llm::ChatClient;
use crate::prompt::PromptStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TutorConfig>,
    pub chat: Arc<ChatService>,
    pub ingestor: Arc<Ingestor>,
    pub prompts: Arc<PromptStore>,
}

impl AppState {
    pub fn new(config: TutorConfig) -> Self {
        let client = Arc::new(ChatClient::new(
            config.api_key.clone(),
            config.api_base.clone(),
        ));
        let chat = Arc::new(ChatService::new(
            client,
            window::from_config(config.history_window),
        ));
        let ingestor = Arc::new(Ingestor::new(config.max_upload_bytes));
        let prompts = Arc::new(PromptStore::new(config.prompt_path.clone()));

        Self {
            config: Arc::new(config),
            chat,
            ingestor,
            prompts,
        }
    }
}
