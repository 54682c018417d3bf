// src/chat/mod.rs
// Turn orchestration: assemble the outgoing payload, start the completion
// stream, and commit the assistant turn only after the stream completes.

pub mod window;

pub use window::{FullReplay, HistoryWindow, TailWindow};

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::llm::{ChatClient, ChatStream, ContentBlock, Message, MessageContent, Role};
use crate::session::SessionState;

pub struct ChatService {
    client: Arc<ChatClient>,
    window: Box<dyn HistoryWindow>,
}

impl ChatService {
    pub fn new(client: Arc<ChatClient>, window: Box<dyn HistoryWindow>) -> Self {
        Self { client, window }
    }

    /// Content for the outgoing user turn: a bare string, or
    /// `[text, document]` when an attachment is pending.
    pub fn outgoing_content(
        user_text: String,
        document: Option<ContentBlock>,
    ) -> MessageContent {
        match document {
            Some(document) => {
                MessageContent::Blocks(vec![ContentBlock::Text { text: user_text }, document])
            }
            None => MessageContent::Text(user_text),
        }
    }

    /// The full request payload: one system message carrying the session's
    /// current prompt, then the windowed history in chronological order.
    pub fn build_payload(&self, session: &SessionState) -> Vec<Message> {
        let mut payload = vec![Message::system(session.system_prompt())];
        payload.extend_from_slice(self.window.select(session.messages()));
        payload
    }

    /// Append the user turn (consuming any pending attachment) and start
    /// the completion stream.
    ///
    /// The user message is committed before the endpoint is invoked: a
    /// failed turn leaves history as it was plus that one user message, so
    /// the user can simply re-send. The assistant message is only appended
    /// via [`ChatService::complete_turn`] once the stream finished.
    pub async fn send_turn(
        &self,
        session: &mut SessionState,
        user_text: String,
    ) -> Result<ChatStream> {
        let document = session.take_pending_document();
        let has_attachment = document.is_some();
        session.append_turn(Role::User, Self::outgoing_content(user_text, document));

        let payload = self.build_payload(session);
        debug!(
            session = session.id(),
            history = session.messages().len(),
            payload = payload.len(),
            has_attachment,
            "sending turn"
        );

        self.client.stream_chat(session.model(), &payload).await
    }

    /// Commit the accumulated assistant text after a completed stream.
    pub fn complete_turn(&self, session: &mut SessionState, full_text: String) {
        info!(
            session = session.id(),
            chars = full_text.len(),
            "turn complete"
        );
        session.append_turn(Role::Assistant, full_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageDetail;

    fn service(window: Box<dyn HistoryWindow>) -> ChatService {
        let client = Arc::new(ChatClient::new(
            "test-key".to_string(),
            "http://127.0.0.1:9".to_string(),
        ));
        ChatService::new(client, window)
    }

    fn session_with(history: &[(&str, Role)]) -> SessionState {
        let mut session = SessionState::new("gpt-4o".to_string(), "Be a tutor.".to_string());
        for (text, role) in history {
            session.append_turn(*role, text.to_string());
        }
        session
    }

    #[test]
    fn test_outgoing_content_without_attachment_is_bare_text() {
        let content = ChatService::outgoing_content("Explain recursion".to_string(), None);
        assert_eq!(content, MessageContent::Text("Explain recursion".to_string()));
    }

    #[test]
    fn test_outgoing_content_with_attachment_is_text_then_document() {
        let doc = ContentBlock::Image {
            encoded: "QUJD".to_string(),
            mime: "image/png".to_string(),
            detail: ImageDetail::High,
        };
        let content =
            ChatService::outgoing_content("what is this?".to_string(), Some(doc.clone()));
        match content {
            MessageContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[0], ContentBlock::text("what is this?"));
                assert_eq!(blocks[1], doc);
            }
            other => panic!("expected blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_payload_leads_with_system_prompt() {
        let service = service(Box::new(FullReplay));
        let session = session_with(&[("hi", Role::User), ("hello!", Role::Assistant)]);

        let payload = service.build_payload(&session);
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[0].role, Role::System);
        assert_eq!(payload[0].content.as_display_text(), "Be a tutor.");
        assert_eq!(payload[1].role, Role::User);
        assert_eq!(payload[2].role, Role::Assistant);
    }

    #[test]
    fn test_tail_window_bounds_payload_but_not_history() {
        let service = service(Box::new(TailWindow { max_messages: 2 }));
        let session = session_with(&[
            ("one", Role::User),
            ("two", Role::Assistant),
            ("three", Role::User),
            ("four", Role::Assistant),
        ]);

        let payload = service.build_payload(&session);
        // System message plus the last two turns only.
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[1].content.as_display_text(), "three");
        assert_eq!(payload[2].content.as_display_text(), "four");
        // The session itself still holds everything.
        assert_eq!(session.messages().len(), 4);
    }
}
