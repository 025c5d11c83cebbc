//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Required secrets are validated once at startup;
//! a missing upstream credential is a fatal startup condition, never a
//! per-request error.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Upstream completion provider configuration
    pub provider: ProviderConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// Upstream completion provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key for the completion provider
    pub api_key: String,
    /// Model identifier sent with every completion request
    pub model: String,
    /// Upper bound on the total duration of one streaming relay (seconds)
    pub relay_timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("relay_timeout_secs", &self.relay_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    /// Returns an error if `OPENAI_API_KEY` is absent or empty. The process
    /// must refuse to start without an upstream credential.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY must be set"))?;
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_API_KEY must not be empty"));
        }

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            persistence: PersistenceConfig {
                database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| {
                    // Default to ~/.wellbeing-gateway or current directory
                    if let Some(home) = env::var_os("HOME") {
                        format!("{}/.wellbeing-gateway/chat.db", home.to_string_lossy())
                    } else {
                        ".wellbeing-gateway/chat.db".to_string()
                    }
                }),
            },
            provider: ProviderConfig {
                api_key,
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                relay_timeout_secs: env::var("RELAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(120),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
