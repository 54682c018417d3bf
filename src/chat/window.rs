// src/chat/window.rs
// History selection is a swappable policy so bounded-context strategies
// can replace full replay without touching the orchestrator.

use crate::llm::Message;

pub trait HistoryWindow: Send + Sync {
    /// Select the slice of history to replay to the endpoint, oldest first.
    fn select<'a>(&self, messages: &'a [Message]) -> &'a [Message];
}

/// Re-send the entire transcript every turn. Cost grows linearly with
/// conversation length.
pub struct FullReplay;

impl HistoryWindow for FullReplay {
    fn select<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        messages
    }
}

/// Keep only the most recent `max_messages` messages.
pub struct TailWindow {
    pub max_messages: usize,
}

impl HistoryWindow for TailWindow {
    fn select<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        let start = messages.len().saturating_sub(self.max_messages);
        &messages[start..]
    }
}

/// Map the configured window size onto a policy: 0 means full replay.
pub fn from_config(history_window: usize) -> Box<dyn HistoryWindow> {
    if history_window == 0 {
        Box::new(FullReplay)
    } else {
        Box::new(TailWindow {
            max_messages: history_window,
        })
    }
}
