// src/api/ws/message.rs
// Wire protocol between the browser presentation layer and the session.

use serde::{Deserialize, Serialize};

/// Discrete user actions arriving from the presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    /// Submit one chat turn.
    Message { content: String },
    /// Upload a file: declared MIME type plus base64-encoded bytes.
    Attach {
        mime: String,
        data: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// Commit an edited system prompt.
    CommitPrompt { prompt: String },
    /// Fetch the active prompt for the editor.
    GetPrompt,
    /// Explicitly reset the conversation.
    ClearHistory,
}

/// Render primitives pushed back to the presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// Session created; sent once on connect.
    Ready {
        model: String,
        system_prompt: String,
    },
    /// One streamed response fragment, for progressive rendering.
    Chunk { content: String },
    /// The turn's stream completed and the response is in history.
    Done,
    /// Upload processed. `kind` is the stored block kind, or `null` when
    /// the type is unsupported and treated as "no attachment".
    Attachment { kind: Option<String> },
    Prompt { system_prompt: String },
    PromptUpdated,
    HistoryCleared,
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let parsed: WsClientMessage =
            serde_json::from_str(r#"{"type":"message","content":"Explain recursion"}"#).unwrap();
        match parsed {
            WsClientMessage::Message { content } => assert_eq!(content, "Explain recursion"),
            other => panic!("unexpected variant: {other:?}"),
        }

        let parsed: WsClientMessage =
            serde_json::from_str(r#"{"type":"attach","mime":"image/png","data":"QUJD"}"#).unwrap();
        match parsed {
            WsClientMessage::Attach { mime, data, name } => {
                assert_eq!(mime, "image/png");
                assert_eq!(data, "QUJD");
                assert_eq!(name, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let parsed: WsClientMessage = serde_json::from_str(r#"{"type":"clear_history"}"#).unwrap();
        assert!(matches!(parsed, WsClientMessage::ClearHistory));
    }

    #[test]
    fn test_server_message_tagging() {
        let chunk = WsServerMessage::Chunk {
            content: "hel".to_string(),
        };
        let wire = serde_json::to_value(&chunk).unwrap();
        assert_eq!(wire["type"], "chunk");
        assert_eq!(wire["content"], "hel");

        let skipped = WsServerMessage::Attachment { kind: None };
        let wire = serde_json::to_value(&skipped).unwrap();
        assert_eq!(wire["type"], "attachment");
        assert!(wire["kind"].is_null());
    }

    #[test]
    fn test_error_code_is_omitted_when_absent() {
        let err = WsServerMessage::Error {
            message: "boom".to_string(),
            code: None,
        };
        let wire = serde_json::to_string(&err).unwrap();
        assert!(!wire.contains("code"));
    }
}
