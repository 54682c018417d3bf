// src/llm/mod.rs
// Message and content model shared by the session store, the orchestrator,
// and the completion client.

pub mod client;

pub use client::{ChatClient, ChatStream, StreamEvent};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Conversation roles accepted by the completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Detail hint for image content parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    Auto,
}

impl ImageDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
            ImageDetail::Auto => "auto",
        }
    }
}

/// One normalized block of message content. Exactly one shape per block:
/// extracted text, or a base64-encoded image with its re-encoded MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        encoded: String,
        mime: String,
        detail: ImageDetail,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Image { .. } => "image",
        }
    }

    /// Convert to the endpoint's content-part JSON. Images travel as a
    /// `data:` URI with the detail hint attached.
    pub fn to_content_part(&self) -> Value {
        match self {
            ContentBlock::Text { text } => json!({
                "type": "text",
                "text": text,
            }),
            ContentBlock::Image {
                encoded,
                mime,
                detail,
            } => json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", mime, encoded),
                    "detail": detail.as_str(),
                },
            }),
        }
    }
}

/// Message content: a bare string for plain turns, or an ordered block
/// sequence when an attachment rides along. Untagged so a plain turn stays
/// a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn to_request_content(&self) -> Value {
        match self {
            MessageContent::Text(text) => json!(text),
            MessageContent::Blocks(blocks) => {
                Value::Array(blocks.iter().map(ContentBlock::to_content_part).collect())
            }
        }
    }

    /// Flattened text view, used for logging and history rendering.
    pub fn as_display_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => text.as_str(),
                    ContentBlock::Image { .. } => "[image]",
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

/// One conversation message. Order within a session is chronological and
/// replayed to the endpoint each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn to_request_message(&self) -> Value {
        json!({
            "role": self.role.as_str(),
            "content": self.content.to_request_content(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_content_serializes_as_string() {
        let msg = Message::user("Explain recursion".to_string());
        let wire = msg.to_request_message();
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"], "Explain recursion");
    }

    #[test]
    fn test_block_content_serializes_as_parts() {
        let msg = Message::user(MessageContent::Blocks(vec![
            ContentBlock::text("see attached"),
            ContentBlock::Image {
                encoded: "QUJD".to_string(),
                mime: "image/png".to_string(),
                detail: ImageDetail::High,
            },
        ]));
        let wire = msg.to_request_message();
        let parts = wire["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "see attached");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,QUJD");
        assert_eq!(parts[1]["image_url"]["detail"], "high");
    }

    #[test]
    fn test_content_block_kind_tagging() {
        let text = ContentBlock::text("hi");
        let tagged = serde_json::to_value(&text).unwrap();
        assert_eq!(tagged["kind"], "text");

        let image = ContentBlock::Image {
            encoded: String::new(),
            mime: "image/png".to_string(),
            detail: ImageDetail::High,
        };
        let tagged = serde_json::to_value(&image).unwrap();
        assert_eq!(tagged["kind"], "image");
        assert_eq!(tagged["detail"], "high");
    }

    #[test]
    fn test_display_text_flattens_blocks() {
        let content = MessageContent::Blocks(vec![
            ContentBlock::text("caption"),
            ContentBlock::Image {
                encoded: String::new(),
                mime: "image/png".to_string(),
                detail: ImageDetail::High,
            },
        ]);
        assert_eq!(content.as_display_text(), "caption\n[image]");
    }
}
