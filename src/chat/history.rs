//! Conversation history assembly
//!
//! Rebuilds a bounded, provider-ready conversation context from persisted
//! messages. Guests have no persisted history, so they always get the bare
//! system instruction. A failed history read degrades to empty context
//! rather than failing the turn.

use crate::chat::db::ChatDb;
use crate::provider::types::ChatTurn;
use tracing::warn;

/// Maximum number of prior messages included in the prompt
///
/// This is a message-count cap, not a token budget. A very long
/// conversation is approximated by its most recent window.
pub const HISTORY_LIMIT: i64 = 20;

/// Behavioral policy sent as the single system turn on every request
pub const SYSTEM_PROMPT: &str = "You are a supportive, non-clinical wellbeing coach. \
Communicate with warmth, validation, and gentle structure. \
Do: reflective listening, CBT/DBT-informed coping ideas, small actionable steps, and brief summaries. \
Don't: diagnose, claim you are a therapist, or give medical/legal advice. \
If the user is in crisis or at risk, stop and encourage them to contact a crisis helpline immediately. \
Keep replies under 180 words, plain language, no jargon.";

/// Assemble the ordered prompt turns for a session
///
/// Loads the most recent [`HISTORY_LIMIT`] messages, reverses them into
/// chronological order, and maps senders to provider roles. The returned
/// sequence always starts with exactly one system turn. Pass `None` for
/// guest sessions, which have nothing persisted to read.
pub async fn assemble(db: &ChatDb, session_id: Option<&str>) -> Vec<ChatTurn> {
    let mut turns = vec![ChatTurn::system(SYSTEM_PROMPT)];

    let Some(session_id) = session_id else {
        return turns;
    };

    match db.recent_messages(session_id, HISTORY_LIMIT).await {
        Ok(mut messages) => {
            messages.reverse();
            for msg in messages {
                let role = msg.sender_enum().role();
                turns.push(ChatTurn::new(role, msg.content));
            }
        }
        Err(e) => {
            // History is a nice-to-have; a dead store must not kill the turn.
            warn!(
                session_id = %session_id,
                error = %e,
                "Failed to load conversation history, continuing with empty context"
            );
        }
    }

    turns
}
