//! Chat database operations
//!
//! Handles all database interactions for sessions and messages. Every
//! write is an independent insert; the user-before-AI ordering guarantee
//! is achieved by call sequencing in the request handler, not by a
//! transaction spanning the whole turn.

use crate::chat::models::{Sender, Session, StoredMessage};
use crate::error::AppError;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool for chat storage
pub struct ChatDb {
    pool: SqlitePool,
}

impl ChatDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(ChatDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
            })?;
        }

        // SQLite connection string format: sqlite://path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_chat.sql");

        // Remove comments (lines starting with --) and normalize whitespace
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            // Remove inline comments (everything after --)
            let without_comments = if let Some(comment_pos) = trimmed.find("--") {
                &trimmed[..comment_pos]
            } else {
                trimmed
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        let statements: Vec<&str> = cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get all sessions owned by a user, newest first
    pub async fn get_sessions(&self, user_id: &str) -> Result<Vec<Session>, AppError> {
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, title, started_at FROM sessions WHERE user_id = ? ORDER BY started_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch sessions: {}", e)))?;

        Ok(sessions)
    }

    /// Get a session by ID
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, title, started_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch session: {}", e)))?;

        Ok(session)
    }

    /// Create a new session row
    pub async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (id, user_id, title, started_at) VALUES (?, ?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(&session.title)
            .bind(session.started_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create session: {}", e)))?;

        debug!("Created session: {}", session.id);
        Ok(())
    }

    /// Get all messages for a session, oldest first
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, AppError> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            "SELECT id, session_id, sender, content, created_at FROM messages WHERE session_id = ? ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch messages: {}", e)))?;

        Ok(messages)
    }

    /// Get the most recent messages for a session, newest first
    ///
    /// Callers that need chronological order reverse the result.
    pub async fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, AppError> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            "SELECT id, session_id, sender, content, created_at FROM messages WHERE session_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch messages: {}", e)))?;

        Ok(messages)
    }

    /// Append a message to a session
    pub async fn add_message(&self, message: &StoredMessage) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO messages (id, session_id, sender, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.session_id)
        .bind(&message.sender)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to add message: {}", e)))?;

        debug!(
            "Added {} message {} to session {}",
            message.sender, message.id, message.session_id
        );
        Ok(())
    }

    /// Count user-sent messages for an identity on a given UTC calendar day
    ///
    /// Counts across all the user's sessions. The day is compared as a
    /// half-open unix-timestamp range rather than a formatted-date string,
    /// so every message stamped within the day is counted exactly once.
    pub async fn count_user_messages_on(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<i64, AppError> {
        let day_start = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Invalid date: {}", day)))?
            .and_utc()
            .timestamp();
        let day_end = day_start + 86_400;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages m \
             JOIN sessions s ON s.id = m.session_id \
             WHERE s.user_id = ? AND m.sender = ? AND m.created_at >= ? AND m.created_at < ?",
        )
        .bind(user_id)
        .bind(Sender::User.as_str())
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to count messages: {}", e)))?;

        Ok(count)
    }

    /// Get the database pool (for advanced operations if needed)
    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
