//! Streaming utilities for Server-Sent Events (SSE)
//!
//! Turns a relay channel into an SSE HTTP response. The AI turn is
//! persisted here, on the normal end-of-stream event only: a mid-flight
//! error or a client disconnect discards the partial text, so no garbled
//! AI turns ever land in history.

use crate::chat::models::{Sender, StoredMessage};
use crate::chat::ChatDb;
use crate::error::AppError;
use crate::provider::RelayEvent;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

/// Build the SSE response for a relay channel
///
/// Each `Token` event becomes one `data: {"content": ...}` record. The
/// upstream terminal sentinel is consumed internally and never forwarded;
/// the downstream stream simply closes. When `persist_session` is set, the
/// accumulated reply is written as the session's AI turn on completion; a
/// failed write is logged and the response still closes normally, because
/// the reply has already been shown to the caller.
pub fn relay_sse_response(
    rx: mpsc::Receiver<Result<RelayEvent, AppError>>,
    db: Arc<ChatDb>,
    persist_session: Option<String>,
) -> Result<Response, AppError> {
    let sse_stream = async_stream::stream! {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            match event {
                Ok(RelayEvent::Token(fragment)) => {
                    let payload = serde_json::json!({ "content": fragment });
                    yield Ok::<_, std::io::Error>(format!("data: {}\n\n", payload));
                }
                Ok(RelayEvent::Complete { text }) => {
                    if let Some(session_id) = &persist_session {
                        let message = StoredMessage::new(
                            Uuid::new_v4().to_string(),
                            session_id.clone(),
                            Sender::Ai,
                            text,
                        );
                        if let Err(e) = db.add_message(&message).await {
                            // The reply already reached the caller; losing
                            // the history row must not abort the response.
                            error!(
                                session_id = %session_id,
                                error = %e,
                                "Failed to save AI message"
                            );
                        }
                    }
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Relay stream failed mid-flight, tearing down response");
                    yield Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "upstream stream error",
                    ));
                    break;
                }
            }
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build SSE response: {}", e)))
}
