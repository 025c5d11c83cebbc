//! API utility functions
//!
//! Shared router state and request validation helpers used by the HTTP
//! handlers.

use crate::chat::ChatDb;
use crate::error::AppError;
use crate::provider::CompletionClient;
use std::sync::Arc;

/// Shared state handed to every route handler
pub type RouterState = (Arc<ChatDb>, Arc<CompletionClient>);

/// Maximum message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Validate an inbound chat message
///
/// # Returns
/// * `Ok(())` - Message is valid
/// * `Err(AppError)` - Message is empty or too long
pub fn validate_message(message: &str) -> Result<(), AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(
            "Message cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Message exceeds maximum length of {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}
