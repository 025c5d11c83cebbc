//! Chat request orchestration
//!
//! The single policy-and-streaming endpoint in front of the completion
//! provider. Per request: validate, crisis gate, quota gate, session
//! resolution, durable user turn, history assembly, streaming relay, and
//! the AI turn on normal stream end. A message that trips a gate is never
//! persisted and never reaches the provider.

use crate::api::streaming::relay_sse_response;
use crate::api::utils::{validate_message, RouterState};
use crate::chat::models::{Identity, Sender, Session, StoredMessage};
use crate::chat::{history, ChatDb};
use crate::error::AppError;
use crate::policy::{crisis, quota};
use crate::provider::ChatTurn;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Inbound chat request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Session to continue; absent on the first turn of a conversation
    #[serde(default)]
    pub session_id: Option<String>,
    /// Authenticated user id; absent denotes the guest tier
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Short-circuit response when crisis language is detected
#[derive(Debug, Serialize)]
pub struct CrisisResponse {
    /// Always true; lets the client switch to its crisis support view
    pub crisis: bool,
    /// Fixed supportive message; never identifies the matched keyword
    pub message: String,
}

/// Generate a session title from the first message
/// Truncates to first sentence or 50 characters, whichever comes first
pub fn generate_title_from_message(content: &str) -> String {
    let trimmed = content.trim();

    // Try to find first sentence (ending with . ! or ?)
    if let Some(sentence_end) = trimmed.find(['.', '!', '?']) {
        let sentence = &trimmed[..=sentence_end];
        if sentence.len() <= 60 {
            return sentence.trim().to_string();
        }
    }

    // Otherwise truncate to 50 characters
    if trimmed.chars().count() > 50 {
        let prefix: String = trimmed.chars().take(47).collect();
        format!("{}...", prefix)
    } else {
        trimmed.to_string()
    }
}

/// Resolve the session for this request
///
/// Authenticated callers without a session id get a durable row created
/// exactly once, titled from the first message. Guests get an ephemeral id
/// that is never persisted. A supplied session id must exist and belong to
/// the calling user.
///
/// Returns the session id and whether turns should be persisted to it.
async fn resolve_session(
    db: &ChatDb,
    identity: &Identity,
    requested: Option<String>,
    first_message: &str,
) -> Result<(String, bool), AppError> {
    match identity {
        Identity::Guest => {
            let id = requested.unwrap_or_else(|| Uuid::new_v4().to_string());
            Ok((id, false))
        }
        Identity::User(user_id) => match requested {
            Some(id) => {
                let session = db
                    .get_session(&id)
                    .await?
                    .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
                if session.user_id != *user_id {
                    return Err(AppError::SessionNotFound(id));
                }
                Ok((id, true))
            }
            None => {
                let title = generate_title_from_message(first_message);
                let session = Session::new(Uuid::new_v4().to_string(), user_id.clone(), title);
                db.create_session(&session).await?;
                info!(session_id = %session.id, "Created session for first turn");
                Ok((session.id, true))
            }
        },
    }
}

/// POST /api/chat - Run one chat turn
///
/// Responds with either a short-circuit JSON body (crisis) or a
/// `text/event-stream` of `data: {"content": ...}` records. The resolved
/// session id is echoed in the `X-Session-Id` header so first-turn callers
/// can continue the conversation.
pub async fn chat(
    State((db, completions)): State<RouterState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    validate_message(&request.message)?;

    // Gate 1: crisis language. Skip everything downstream on a match.
    if crisis::detect(&request.message) {
        info!("Crisis language detected, short-circuiting");
        return Ok((
            StatusCode::OK,
            Json(CrisisResponse {
                crisis: true,
                message: crisis::CRISIS_MESSAGE.to_string(),
            }),
        )
            .into_response());
    }

    // Gate 2: daily quota. A failed check denies (fail closed).
    let identity = Identity::from_user_id(request.user_id);
    let today = Utc::now().date_naive();
    if !quota::allow(&db, &identity, today).await? {
        return Err(AppError::QuotaExceeded);
    }

    let (session_id, durable) =
        resolve_session(&db, &identity, request.session_id, &request.message).await?;
    let persist_session = durable.then(|| session_id.clone());

    // Prior context is read before the current turn lands, then the user
    // turn is made durable before the upstream call begins.
    let mut turns = history::assemble(&db, persist_session.as_deref()).await;

    if durable {
        let user_message = StoredMessage::new(
            Uuid::new_v4().to_string(),
            session_id.clone(),
            Sender::User,
            request.message.clone(),
        );
        db.add_message(&user_message).await?;
    }

    turns.push(ChatTurn::user(request.message));
    info!(
        session_id = %session_id,
        guest = identity.is_guest(),
        turns = turns.len(),
        "Opening completion relay"
    );

    let rx = completions.stream_chat(turns).await?;
    let mut response = relay_sse_response(rx, db.clone(), persist_session)?;

    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert("x-session-id", value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_first_sentence_when_short() {
        assert_eq!(
            generate_title_from_message("I feel anxious. It started last week."),
            "I feel anxious."
        );
    }

    #[test]
    fn title_truncates_long_messages() {
        let long = "a".repeat(80);
        let title = generate_title_from_message(&long);
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn title_keeps_short_messages_verbatim() {
        assert_eq!(
            generate_title_from_message("  feeling stressed  "),
            "feeling stressed"
        );
    }
}
