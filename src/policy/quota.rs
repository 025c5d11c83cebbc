//! Daily usage quota enforcement
//!
//! Authenticated users get a fixed number of messages per UTC calendar day,
//! counted against persisted history across all their sessions. Guests are
//! always allowed: without persisted guest state there is nothing to count
//! against, so the guest limit is policy on paper only.

use crate::chat::db::ChatDb;
use crate::chat::models::Identity;
use crate::error::AppError;
use chrono::NaiveDate;

/// Daily message limit for authenticated users
pub const USER_DAILY_LIMIT: i64 = 15;

/// Daily message limit for guests
///
/// Not enforceable under the current design: guests have no durable
/// identity to count against. Kept so the policy number lives in one
/// place if guest tracking is ever added.
pub const GUEST_DAILY_LIMIT: i64 = 5;

/// Check whether an identity may send another message today
///
/// Calendar-day granularity, not a rolling 24 hours. A store failure is
/// returned as [`AppError::QuotaCheckFailed`] so the caller fails closed
/// with a message distinct from "quota exceeded".
pub async fn allow(db: &ChatDb, identity: &Identity, as_of: NaiveDate) -> Result<bool, AppError> {
    match identity {
        // No cross-request tracking is possible for guests; be lenient.
        Identity::Guest => Ok(true),
        Identity::User(user_id) => {
            let count = db
                .count_user_messages_on(user_id, as_of)
                .await
                .map_err(|e| AppError::QuotaCheckFailed(e.to_string()))?;
            Ok(count < USER_DAILY_LIMIT)
        }
    }
}
