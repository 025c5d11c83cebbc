//! Session read API
//!
//! Read-only endpoints the chat UI uses to show the session list and load
//! a conversation's history. Guests never appear here; only authenticated
//! sessions are durable.

use crate::api::utils::RouterState;
use crate::error::AppError;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for listing sessions
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Owning user id
    pub user_id: String,
}

/// Session response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session unique identifier
    pub id: String,
    /// Session title
    pub title: String,
    /// Unix timestamp when the session was started
    pub started_at: i64,
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message unique identifier
    pub id: String,
    /// ID of the session this message belongs to
    pub session_id: String,
    /// "user" or "ai"
    pub sender: String,
    /// Message content
    pub content: String,
    /// Unix timestamp when the message was created
    pub created_at: i64,
}

/// GET /api/sessions?user_id= - List a user's sessions, newest first
pub async fn list_sessions(
    State((db, _)): State<RouterState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = db.get_sessions(&query.user_id).await?;

    let responses: Vec<SessionResponse> = sessions
        .into_iter()
        .map(|s| SessionResponse {
            id: s.id,
            title: s.title,
            started_at: s.started_at,
        })
        .collect();

    Ok(Json(responses))
}

/// GET /api/sessions/:id/messages - Full ordered history for a session
pub async fn session_messages(
    State((db, _)): State<RouterState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    db.get_session(&id)
        .await?
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;

    let messages = db.get_messages(&id).await?;

    let responses: Vec<MessageResponse> = messages
        .into_iter()
        .map(|m| MessageResponse {
            id: m.id,
            session_id: m.session_id,
            sender: m.sender,
            content: m.content,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(responses))
}
