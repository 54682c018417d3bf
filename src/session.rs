// src/session.rs
// Session-scoped conversation state. One instance per presentation
// connection, owned by that connection's task; created on connect,
// dropped on disconnect. Never shared, never a process-wide singleton.

use uuid::Uuid;

use crate::llm::{ContentBlock, Message, MessageContent, Role};

pub struct SessionState {
    id: String,
    model: String,
    system_prompt: String,
    messages: Vec<Message>,
    pending_document: Option<ContentBlock>,
}

impl SessionState {
    pub fn new(model: String, system_prompt: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            model,
            system_prompt,
            messages: Vec::new(),
            pending_document: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Chronological message history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append one turn to the history.
    pub fn append_turn(&mut self, role: Role, content: impl Into<MessageContent>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    /// Empty the message history. Model and system prompt are untouched;
    /// clearing an already-empty history is a no-op.
    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    /// Install a new governing prompt. The history reset is mandatory
    /// whenever the prompt changes, so behaviors never mix mid-conversation.
    pub fn replace_system_prompt(&mut self, prompt: String) {
        self.system_prompt = prompt;
        self.clear_history();
    }

    pub fn pending_document(&self) -> Option<&ContentBlock> {
        self.pending_document.as_ref()
    }

    /// Replace the at-most-one pending attachment. A new upload silently
    /// replaces a prior unconsumed one.
    pub fn set_pending_document(&mut self, block: Option<ContentBlock>) {
        self.pending_document = block;
    }

    /// Consume the pending attachment for the outgoing turn.
    pub fn take_pending_document(&mut self) -> Option<ContentBlock> {
        self.pending_document.take()
    }
}
