// src/api/ws/mod.rs
// One WebSocket connection = one session. The connection task owns the
// session state outright and handles messages sequentially, so a turn in
// flight blocks the next action and no locks are needed.

pub mod message;

pub use message::{WsClientMessage, WsServerMessage};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::error::TutorError;
use crate::ingest::Upload;
use crate::llm::StreamEvent;
use crate::session::SessionState;
use crate::state::AppState;

pub async fn ws_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

/// Session lifecycle: created here on connect, dropped when the loop ends.
async fn handle_session(mut socket: WebSocket, state: AppState) {
    let system_prompt = match state.prompts.load().await {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("🔌 rejecting connection, prompt store unavailable: {e}");
            let _ = send(
                &mut socket,
                &WsServerMessage::Error {
                    message: e.to_string(),
                    code: Some(e.code().to_string()),
                },
            )
            .await;
            return;
        }
    };

    let mut session = SessionState::new(state.config.model.clone(), system_prompt);
    info!(session = session.id(), "🔌 session opened");

    let ready = WsServerMessage::Ready {
        model: session.model().to_string(),
        system_prompt: session.system_prompt().to_string(),
    };
    if send(&mut socket, &ready).await.is_err() {
        return;
    }

    while let Some(received) = socket.recv().await {
        match received {
            Ok(Message::Text(text)) => {
                let action = match serde_json::from_str::<WsClientMessage>(text.as_str()) {
                    Ok(action) => action,
                    Err(e) => {
                        debug!(session = session.id(), "unparseable client message: {e}");
                        if send_unrecognized(&mut socket).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };
                if let Err(e) = route_message(&state, &mut session, &mut socket, action).await {
                    warn!(session = session.id(), "send failed, closing: {e}");
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(session = session.id(), "socket error: {e}");
                break;
            }
        }
    }

    info!(
        session = session.id(),
        messages = session.messages().len(),
        "🔌 session closed"
    );
}

/// Dispatch one user action. `Err` means the socket itself failed and the
/// connection should close; turn-local failures are reported in-band and
/// leave the session usable.
async fn route_message(
    state: &AppState,
    session: &mut SessionState,
    socket: &mut WebSocket,
    action: WsClientMessage,
) -> anyhow::Result<()> {
    match action {
        WsClientMessage::Message { content } => {
            handle_turn(state, session, socket, content).await
        }
        WsClientMessage::Attach { mime, data, name } => {
            handle_attach(state, session, socket, mime, data, name).await
        }
        WsClientMessage::CommitPrompt { prompt } => {
            match state.prompts.commit(&prompt).await {
                Ok(()) => {
                    session.replace_system_prompt(prompt);
                    info!(session = session.id(), "prompt updated, history cleared");
                    send(socket, &WsServerMessage::PromptUpdated).await
                }
                // The file still holds the previous prompt, so the session
                // keeps running under it.
                Err(e) => send_error(socket, &e).await,
            }
        }
        WsClientMessage::GetPrompt => {
            let reply = WsServerMessage::Prompt {
                system_prompt: session.system_prompt().to_string(),
            };
            send(socket, &reply).await
        }
        WsClientMessage::ClearHistory => {
            session.clear_history();
            info!(session = session.id(), "history cleared");
            send(socket, &WsServerMessage::HistoryCleared).await
        }
    }
}

/// One chat turn: stream fragments to the client while accumulating, and
/// commit the assistant message only after the endpoint's explicit
/// end-of-stream signal. Anything less leaves history without a partial
/// assistant message, ready for a clean re-send.
async fn handle_turn(
    state: &AppState,
    session: &mut SessionState,
    socket: &mut WebSocket,
    content: String,
) -> anyhow::Result<()> {
    if content.chars().count() > state.config.max_turn_chars {
        let reply = WsServerMessage::Error {
            message: format!(
                "message exceeds the {} character limit",
                state.config.max_turn_chars
            ),
            code: None,
        };
        return send(socket, &reply).await;
    }

    let mut stream = match state.chat.send_turn(session, content).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(session = session.id(), "turn failed to start: {e}");
            return send_error(socket, &e).await;
        }
    };

    let mut full_text = String::new();
    let mut completed = false;
    let mut failure: Option<TutorError> = None;

    while let Some(event) = stream.next().await {
        match event {
            Ok(StreamEvent::Delta(delta)) => {
                full_text.push_str(&delta);
                send(socket, &WsServerMessage::Chunk { content: delta }).await?;
            }
            Ok(StreamEvent::Done) => {
                completed = true;
                break;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if completed {
        state.chat.complete_turn(session, full_text);
        send(socket, &WsServerMessage::Done).await
    } else {
        let e = failure.unwrap_or_else(|| {
            TutorError::Endpoint("stream ended before completion".to_string())
        });
        warn!(session = session.id(), "turn aborted: {e}");
        send_error(socket, &e).await
    }
}

async fn handle_attach(
    state: &AppState,
    session: &mut SessionState,
    socket: &mut WebSocket,
    mime: String,
    data: String,
    name: Option<String>,
) -> anyhow::Result<()> {
    let bytes = match BASE64.decode(data.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            let e = TutorError::AttachmentDecode(format!("invalid base64 payload: {e}"));
            return send_error(socket, &e).await;
        }
    };

    let upload = Upload { name, mime, bytes };
    match state.ingestor.ingest(Some(&upload)) {
        Ok(Some(block)) => {
            let kind = block.kind().to_string();
            session.set_pending_document(Some(block));
            debug!(session = session.id(), kind = %kind, "attachment staged");
            send(socket, &WsServerMessage::Attachment { kind: Some(kind) }).await
        }
        Ok(None) => send(socket, &WsServerMessage::Attachment { kind: None }).await,
        Err(e) => {
            warn!(session = session.id(), "attachment rejected: {e}");
            send_error(socket, &e).await
        }
    }
}

async fn send(socket: &mut WebSocket, msg: &WsServerMessage) -> anyhow::Result<()> {
    let text = serde_json::to_string(msg)?;
    socket.send(Message::Text(text.into())).await?;
    Ok(())
}

async fn send_error(socket: &mut WebSocket, e: &TutorError) -> anyhow::Result<()> {
    send(
        socket,
        &WsServerMessage::Error {
            message: e.to_string(),
            code: Some(e.code().to_string()),
        },
    )
    .await
}

async fn send_unrecognized(socket: &mut WebSocket) -> anyhow::Result<()> {
    send(
        socket,
        &WsServerMessage::Error {
            message: "unrecognized message".to_string(),
            code: None,
        },
    )
    .await
}
