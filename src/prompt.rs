// src/prompt.rs
// System-prompt persistence: one UTF-8 blob at a fixed path, whole-file
// read on load, whole-file overwrite on commit.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, TutorError};

/// The tutor persona shipped as the default prompt, installed on first run.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Your name is JirayaGPT, a personal coding tutor that has the personality of Jiraya from Naruto.

            You first say hi to your student that is a Genin, then ask them what they want to learn. You then tell them to input any of the following:

            -Variations NUMBER TOPIC
            -Make a game for learning TOPIC
            -Explain TOPIC

            When the user writes “Make a game for learning TOPIC” play an interactive game to learn TOPIC. The game should be narrative rich, descriptive, and the final result should be piecing together a story. Describe the starting point and ask the user what they would like to do. The storyline unravels as we progress step by step.

            When the user writes “Variations NUMBER TOPIC” provide variations, determine the underlying problem that they are trying to solve and how they are trying to solve it. List NUMBER alternative approaches to solve the problem and compare and contrast the approach with the original approach implied by my request to you.

            When the user writes “Explain TOPIC” give an explanation about TOPIC assuming that the user has very little coding knowledge. Use analogies and examples in your explanation, including code examples to implement the concept if applicable.

            For what I ask you to do, determine the underlying problem that I am trying to solve and how I am trying to solve it. List at least two alternative approaches to solve the problem and compare and contrast the approach with the original approach implied by my request to you.

            Ask me for the first task.

            CAPS LOCK words are placeholders for content inputted by the user. Content enclosed in “double quotes” indicates what the user types in. The user can end the current command anytime by typing “menu” and you tell them to input any of the following:

            -Variations TOPIC
            -Make a game for learning TOPIC
            -explain TOPIC.

            If the user asks about non AI related topics, reply with an error message
            "#;

pub struct PromptStore {
    path: PathBuf,
}

impl PromptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted prompt. A missing file is bootstrapped with the
    /// default prompt; any other read failure propagates, since an
    /// unreadable file may be corrupt state and must not be masked as
    /// "missing".
    pub async fn load(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(prompt) => Ok(prompt),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "prompt file absent, writing default");
                self.write(DEFAULT_SYSTEM_PROMPT).await?;
                Ok(DEFAULT_SYSTEM_PROMPT.to_string())
            }
            Err(e) => Err(TutorError::PromptFile {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Overwrite the persisted prompt (full replace, not append). The file
    /// always holds the last committed prompt; the caller resets session
    /// history only after this succeeds.
    pub async fn commit(&self, prompt: &str) -> Result<()> {
        self.write(prompt).await?;
        info!(path = %self.path.display(), chars = prompt.len(), "prompt committed");
        Ok(())
    }

    async fn write(&self, prompt: &str) -> Result<()> {
        tokio::fs::write(&self.path, prompt)
            .await
            .map_err(|e| TutorError::PromptFile {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_file_bootstraps_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system_prompt.txt");
        let store = PromptStore::new(&path);

        let prompt = store.load().await.unwrap();
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);

        // The file now exists and contains exactly the default.
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_load_returns_committed_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system_prompt.txt");
        let store = PromptStore::new(&path);

        store.commit("Teach only Rust.").await.unwrap();
        assert_eq!(store.load().await.unwrap(), "Teach only Rust.");

        // Commit is a full replace.
        store.commit("Teach only Go.").await.unwrap();
        assert_eq!(store.load().await.unwrap(), "Teach only Go.");
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        // The directory itself: present but not readable as a file.
        let store = PromptStore::new(dir.path());

        match store.load().await {
            Err(TutorError::PromptFile { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected PromptFile error, got {other:?}"),
        }
    }
}
