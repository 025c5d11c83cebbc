//! Upstream completion provider integration
//!
//! Wire types, SSE frame buffering, and the streaming relay client.

pub mod openai;
pub mod sse;
pub mod types;

pub use openai::{CompletionClient, RelayEvent};
pub use types::ChatTurn;
