// src/config/mod.rs
// All tunables load from the environment (.env supported); only the
// endpoint credential is required.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, TutorError};

#[derive(Debug, Clone)]
pub struct TutorConfig {
    // ── Completion endpoint
    pub api_key: String,
    pub api_base: String,
    pub model: String,

    // ── Prompt persistence
    pub prompt_path: PathBuf,

    // ── Server
    pub host: String,
    pub port: u16,

    // ── Turn bounds
    /// 0 = full-transcript replay; N = tail window of N messages.
    pub history_window: usize,
    pub max_upload_bytes: usize,
    pub max_turn_chars: usize,
}

/// Parse an env var, tolerating trailing comments and whitespace; missing
/// or unparseable values fall back to the default.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean = val.split('#').next().unwrap_or("").trim();
            match clean.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    debug!("config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl TutorConfig {
    /// Load configuration from the environment. The credential is read once
    /// here; its absence is a fatal configuration error, not deferred to
    /// first use.
    pub fn from_env() -> Result<Self> {
        if dotenvy::dotenv().is_err() {
            debug!("no .env file found, using process environment");
        }

        let api_key = std::env::var("OPENAI_API_KEY")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if api_key.is_empty() {
            return Err(TutorError::Config(
                "OPENAI_API_KEY is not set; the completion endpoint requires a credential"
                    .to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_base: env_var_or("OPENAI_BASE_URL", "https://api.openai.com/v1".to_string()),
            model: env_var_or("TUTOR_MODEL", "gpt-4o".to_string()),
            prompt_path: PathBuf::from(env_var_or(
                "TUTOR_PROMPT_PATH",
                "system_prompt.txt".to_string(),
            )),
            host: env_var_or("TUTOR_HOST", "0.0.0.0".to_string()),
            port: env_var_or("TUTOR_PORT", 3001),
            history_window: env_var_or("TUTOR_HISTORY_WINDOW", 0),
            max_upload_bytes: env_var_or("TUTOR_MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            max_turn_chars: env_var_or("TUTOR_MAX_TURN_CHARS", 32 * 1024),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
