// src/error.rs
// Error taxonomy for the tutor backend.
//
// Config and PromptFile are fatal at startup/load; AttachmentDecode and
// Endpoint are local to one turn and never corrupt session state beyond it.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Attachment decode error: {0}")]
    AttachmentDecode(String),

    #[error("Prompt file error at {}: {source}", .path.display())]
    PromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Completion endpoint error: {0}")]
    Endpoint(String),
}

impl TutorError {
    /// Stable code sent to the presentation layer alongside error messages.
    pub fn code(&self) -> &'static str {
        match self {
            TutorError::Config(_) => "config",
            TutorError::AttachmentDecode(_) => "attachment_decode",
            TutorError::PromptFile { .. } => "prompt_file",
            TutorError::Endpoint(_) => "endpoint",
        }
    }
}

pub type Result<T> = std::result::Result<T, TutorError>;
