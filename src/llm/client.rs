// src/llm/client.rs
// Streaming client for an OpenAI-compatible chat completions endpoint.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::try_stream;
use futures::stream::{Stream, StreamExt};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Result, TutorError};
use crate::llm::Message;

/// Events yielded while consuming a completion stream. `Done` is the
/// endpoint's explicit end-of-stream signal; a stream that ends without it
/// was cut off and must not be committed to history.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta(String),
    Done,
}

pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl ChatClient {
    /// No local request timeout: the endpoint's own behavior governs
    /// latency bounds.
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Start a streaming chat completion. The returned stream yields text
    /// fragments in arrival order, then `Done` once the endpoint signals
    /// end of stream.
    pub async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<ChatStream> {
        let payload = json!({
            "model": model,
            "messages": messages
                .iter()
                .map(Message::to_request_message)
                .collect::<Vec<_>>(),
            "stream": true,
        });

        debug!(model, messages = messages.len(), "starting completion stream");

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| TutorError::Endpoint(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Endpoint(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let bytes = Box::pin(response.bytes_stream());

        let stream = try_stream! {
            let mut lines = SseLines::new(bytes);
            while let Some(line) = lines.next().await {
                let line = line?;
                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data == "[DONE]" {
                    yield StreamEvent::Done;
                    break;
                }
                match serde_json::from_str::<Value>(data) {
                    Ok(chunk) => {
                        if let Some(err) = chunk.get("error") {
                            Err::<(), _>(TutorError::Endpoint(format!("stream error: {err}")))?;
                        }
                        if let Some(delta) = chunk["choices"][0]["delta"]["content"].as_str() {
                            if !delta.is_empty() {
                                yield StreamEvent::Delta(delta.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        warn!("skipping unparseable stream chunk: {e}");
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// SSE line splitter that buffers bytes across chunk boundaries, so a
/// fragment split mid-line (or mid-codepoint) reassembles correctly.
struct SseLines<S> {
    inner: S,
    buffer: Vec<u8>,
}

impl<S> SseLines<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn take_line(&mut self, newline: usize) -> Result<String> {
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop(); // the '\n'
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        String::from_utf8(line)
            .map_err(|e| TutorError::Endpoint(format!("invalid UTF-8 in stream: {e}")))
    }
}

impl<S, B> Stream for SseLines<S>
where
    S: Stream<Item = std::result::Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(pos) = this.buffer.iter().position(|&b| b == b'\n') {
                return Poll::Ready(Some(this.take_line(pos)));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.buffer.extend_from_slice(chunk.as_ref());
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(TutorError::Endpoint(format!(
                        "stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => {
                    if this.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    let rest = std::mem::take(&mut this.buffer);
                    return Poll::Ready(Some(String::from_utf8(rest).map_err(|e| {
                        TutorError::Endpoint(format!("invalid UTF-8 in stream: {e}"))
                    })));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunked(parts: Vec<&'static str>) -> impl Stream<Item = std::result::Result<&'static [u8], reqwest::Error>> + Unpin {
        stream::iter(parts.into_iter().map(|p| Ok(p.as_bytes())))
    }

    #[tokio::test]
    async fn test_lines_reassemble_across_chunks() {
        let inner = chunked(vec!["data: hel", "lo\ndata: wor", "ld\n"]);
        let lines: Vec<String> = SseLines::new(inner)
            .map(|l| l.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: hello", "data: world"]);
    }

    #[tokio::test]
    async fn test_crlf_lines_are_trimmed() {
        let inner = chunked(vec!["data: one\r\n\r\ndata: two\r\n"]);
        let lines: Vec<String> = SseLines::new(inner)
            .map(|l| l.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: one", "", "data: two"]);
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline_is_flushed() {
        let inner = chunked(vec!["data: tail"]);
        let lines: Vec<String> = SseLines::new(inner)
            .map(|l| l.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: tail"]);
    }
}
