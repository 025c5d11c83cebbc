//! Streaming completion relay
//!
//! Opens one streaming request against the OpenAI chat-completions API and
//! pumps incremental fragments through a bounded channel. The producer
//! (upstream reader task) is decoupled from the consumer (the HTTP
//! response body), so a slow or disconnected client cannot stall the
//! upstream read: a dropped receiver makes the next send fail, the
//! producer returns, and dropping the response tears the upstream
//! connection down.

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::provider::sse::drain_data_lines;
use crate::provider::types::{ChatCompletionRequest, ChatTurn, StreamChunk};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Output token ceiling, sized to keep replies under roughly 180 words
pub const MAX_OUTPUT_TOKENS: u32 = 600;

/// Fixed sampling temperature for every completion
pub const TEMPERATURE: f32 = 0.7;

/// Terminal record the provider sends when the stream is finished
const DONE_SENTINEL: &str = "[DONE]";

/// Bounded capacity between the upstream reader and the response writer
const CHANNEL_CAPACITY: usize = 32;

/// One event on the relay channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// An incremental text fragment, forward to the caller as it arrives
    Token(String),
    /// Normal end of stream; carries the full accumulated reply text
    Complete {
        /// Concatenation of every fragment, in arrival order
        text: String,
    },
}

/// Client for the upstream streaming completion provider
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    relay_timeout: Duration,
}

impl CompletionClient {
    /// Create a client against the real provider endpoint
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_base_url(config, OPENAI_API_BASE_URL)
    }

    /// Create a client against a custom base URL (used by tests)
    pub fn with_base_url(config: &ProviderConfig, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            relay_timeout: Duration::from_secs(config.relay_timeout_secs),
        }
    }

    /// Open a streaming completion and return the relay channel
    ///
    /// A non-success HTTP status surfaces as a single [`AppError::Upstream`]
    /// before any stream is opened. On success the returned receiver yields
    /// zero or more `Token` events followed by exactly one of: a `Complete`
    /// event (normal end), or an error (mid-flight failure, missing
    /// terminal sentinel, or timeout). After a mid-flight error the
    /// accumulated partial text is discarded, never delivered.
    pub async fn stream_chat(
        &self,
        turns: Vec<ChatTurn>,
    ) -> Result<mpsc::Receiver<Result<RelayEvent, AppError>>, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: turns,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            stream: true,
        };

        debug!(
            url = %url,
            model = %self.model,
            turns = request_body.messages.len(),
            "Opening streaming completion"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(AppError::Upstream(format!(
                "provider returned status {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let relay_timeout = self.relay_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(relay_timeout, pump_stream(response, &tx)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    let _ = tx.send(Err(e)).await;
                }
                Err(_) => {
                    let _ = tx
                        .send(Err(AppError::Upstream(format!(
                            "stream exceeded {}s relay timeout",
                            relay_timeout.as_secs()
                        ))))
                        .await;
                }
            }
        });

        Ok(rx)
    }
}

/// Read the upstream body and feed fragments into the channel
///
/// Returns `Ok(())` on a normal `[DONE]` sentinel or when the receiver is
/// dropped; returns an error for a read failure or an EOF that arrives
/// without the sentinel.
async fn pump_stream(
    response: reqwest::Response,
    tx: &mpsc::Sender<Result<RelayEvent, AppError>>,
) -> Result<(), AppError> {
    let mut body = response.bytes_stream();
    // Raw bytes: a multibyte character can be split across chunks, so
    // decoding only happens per complete line inside drain_data_lines.
    let mut buffer: Vec<u8> = Vec::new();
    let mut accumulated = String::new();

    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(|e| AppError::Upstream(format!("stream read failed: {}", e)))?;
        buffer.extend_from_slice(&bytes);

        for payload in drain_data_lines(&mut buffer) {
            if payload == DONE_SENTINEL {
                let text = std::mem::take(&mut accumulated);
                debug!(reply_len = text.len(), "Completion stream finished");
                let _ = tx.send(Ok(RelayEvent::Complete { text })).await;
                return Ok(());
            }

            match serde_json::from_str::<StreamChunk>(&payload) {
                Ok(frame) => {
                    if let Some(fragment) = frame.into_fragment() {
                        accumulated.push_str(&fragment);
                        if tx.send(Ok(RelayEvent::Token(fragment))).await.is_err() {
                            // Client disconnected; stop reading upstream.
                            debug!("Downstream receiver dropped, cancelling upstream read");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    // One bad frame never kills the stream.
                    warn!(error = %e, "Skipping malformed stream frame");
                }
            }
        }
    }

    Err(AppError::Upstream(
        "stream ended without terminal sentinel".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;
    use std::io::Write;

    fn test_config() -> ProviderConfig {
        ProviderConfig {
            api_key: "test-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            relay_timeout_secs: 5,
        }
    }

    fn frame(content: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n\n",
            serde_json::to_string(content).unwrap()
        )
    }

    async fn collect(
        mut rx: mpsc::Receiver<Result<RelayEvent, AppError>>,
    ) -> Vec<Result<RelayEvent, AppError>> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    #[serial]
    async fn fragments_are_forwarded_and_accumulated() {
        let mut server = Server::new_async().await;
        let body = format!(
            "{}{}{}data: [DONE]\n\n",
            frame("Hel"),
            frame("lo"),
            frame(" there")
        );
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let rx = client
            .stream_chat(vec![ChatTurn::user("hi")])
            .await
            .unwrap();
        let events = collect(rx).await;

        mock.assert_async().await;
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &RelayEvent::Token("Hel".to_string())
        );
        assert_eq!(
            events[1].as_ref().unwrap(),
            &RelayEvent::Token("lo".to_string())
        );
        assert_eq!(
            events[2].as_ref().unwrap(),
            &RelayEvent::Token(" there".to_string())
        );
        assert_eq!(
            events[3].as_ref().unwrap(),
            &RelayEvent::Complete {
                text: "Hello there".to_string()
            }
        );
    }

    #[tokio::test]
    #[serial]
    async fn multibyte_fragment_split_across_chunks_is_not_corrupted() {
        let mut server = Server::new_async().await;
        let mut body = frame("💙").into_bytes();
        body.extend_from_slice(b"data: [DONE]\n\n");
        // Split mid-way through the four-byte emoji sequence so the two
        // halves arrive in separate network chunks.
        let emoji_pos = body
            .windows(4)
            .position(|w| w == "💙".as_bytes())
            .unwrap();
        let (first, second) = body.split_at(emoji_pos + 2);
        let (first, second) = (first.to_vec(), second.to_vec());

        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_chunked_body(move |writer| {
                writer.write_all(&first)?;
                writer.flush()?;
                writer.write_all(&second)
            })
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let rx = client
            .stream_chat(vec![ChatTurn::user("hi")])
            .await
            .unwrap();
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &RelayEvent::Token("💙".to_string())
        );
        assert_eq!(
            events[1].as_ref().unwrap(),
            &RelayEvent::Complete {
                text: "💙".to_string()
            }
        );
    }

    #[tokio::test]
    #[serial]
    async fn malformed_frame_is_skipped_not_fatal() {
        let mut server = Server::new_async().await;
        let body = format!(
            "{}data: this is not json\n\n{}data: [DONE]\n\n",
            frame("Hel"),
            frame("lo")
        );
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let rx = client
            .stream_chat(vec![ChatTurn::user("hi")])
            .await
            .unwrap();
        let events = collect(rx).await;

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2].as_ref().unwrap(),
            &RelayEvent::Complete {
                text: "Hello".to_string()
            }
        );
    }

    #[tokio::test]
    #[serial]
    async fn role_announcement_frame_emits_no_token() {
        let mut server = Server::new_async().await;
        let body = format!(
            "data: {{\"choices\":[{{\"delta\":{{\"role\":\"assistant\"}}}}]}}\n\n{}data: [DONE]\n\n",
            frame("Hi")
        );
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let rx = client
            .stream_chat(vec![ChatTurn::user("hi")])
            .await
            .unwrap();
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &RelayEvent::Token("Hi".to_string())
        );
    }

    #[tokio::test]
    #[serial]
    async fn http_failure_surfaces_before_streaming() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body(r#"{"error": "boom"}"#)
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let result = client.stream_chat(vec![ChatTurn::user("hi")]).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    #[serial]
    async fn eof_without_sentinel_is_a_stream_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(frame("Hel"))
            .create_async()
            .await;

        let client = CompletionClient::with_base_url(&test_config(), &server.url());
        let rx = client
            .stream_chat(vec![ChatTurn::user("hi")])
            .await
            .unwrap();
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(AppError::Upstream(_))));
    }
}
