//! Chat data models
//!
//! Defines structures for sessions, stored messages, and caller identity.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Who sent a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message from the end user
    User,
    /// Message from the assistant
    Ai,
}

impl Sender {
    /// Convert the sender to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }

    /// Provider-side role name for this sender
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "assistant",
        }
    }
}

impl From<&str> for Sender {
    fn from(s: &str) -> Self {
        match s {
            "ai" => Sender::Ai,
            _ => Sender::User,
        }
    }
}

/// The identity tier of a caller
///
/// Guests carry no durable state: their sessions are ephemeral and nothing
/// they send is persisted. Authenticated users get durable sessions and a
/// daily quota counted against stored history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Unauthenticated caller, identified only for the lifetime of a request
    Guest,
    /// Authenticated caller with a stable user id
    User(String),
}

impl Identity {
    /// Build an identity from an optional user id (absent means guest)
    pub fn from_user_id(user_id: Option<String>) -> Self {
        match user_id {
            Some(id) if !id.trim().is_empty() => Identity::User(id),
            _ => Identity::Guest,
        }
    }

    /// Whether this identity is the guest tier
    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }
}

/// A durable conversation thread owned by an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique identifier for the session
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Title of the session (auto-generated from the first message)
    pub title: String,
    /// When the session was started (Unix timestamp)
    pub started_at: i64,
}

impl Session {
    /// Create a new session
    pub fn new(id: String, user_id: String, title: String) -> Self {
        Self {
            id,
            user_id,
            title,
            started_at: Utc::now().timestamp(),
        }
    }
}

/// A single persisted message in a session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredMessage {
    /// Unique identifier for the message
    pub id: String,
    /// ID of the session this message belongs to
    pub session_id: String,
    /// Sender of the message, stored as "user" or "ai"
    pub sender: String,
    /// Content of the message
    pub content: String,
    /// When the message was created (Unix timestamp)
    pub created_at: i64,
}

impl StoredMessage {
    /// Create a new message stamped with the current time
    pub fn new(id: String, session_id: String, sender: Sender, content: String) -> Self {
        Self {
            id,
            session_id,
            sender: sender.as_str().to_string(),
            content,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Get the sender as an enum
    pub fn sender_enum(&self) -> Sender {
        Sender::from(self.sender.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_from_user_id() {
        assert!(Identity::from_user_id(None).is_guest());
        assert!(Identity::from_user_id(Some("  ".to_string())).is_guest());
        assert_eq!(
            Identity::from_user_id(Some("user-1".to_string())),
            Identity::User("user-1".to_string())
        );
    }

    #[test]
    fn sender_roles_map_to_provider_roles() {
        assert_eq!(Sender::User.role(), "user");
        assert_eq!(Sender::Ai.role(), "assistant");
        assert_eq!(Sender::from("ai"), Sender::Ai);
        assert_eq!(Sender::from("user"), Sender::User);
    }
}
