//! SSE frame buffering for the upstream completion stream
//!
//! The provider emits newline-delimited `data: <payload>` records. Network
//! chunks can split a record anywhere, including mid-way through a
//! multibyte UTF-8 character, so incoming bytes are buffered raw and only
//! complete lines are decoded; a trailing partial line stays buffered for
//! the next chunk.

use tracing::warn;

/// Pull the payloads of all complete `data:` lines out of the buffer
///
/// The buffer is drained in place at the byte level; decoding happens per
/// fully assembled line, so a character split across network chunks is
/// reassembled before it is ever interpreted as text. Non-`data:` lines
/// (blank separators, `event:`/`id:` fields) are consumed and discarded;
/// payloads are returned with surrounding whitespace trimmed. Empty
/// payloads and lines that are not valid UTF-8 are dropped.
pub(crate) fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut payloads = Vec::new();

    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
        let line = match std::str::from_utf8(&line_bytes) {
            Ok(line) => line.trim(),
            Err(e) => {
                // A complete line that still isn't UTF-8 is a broken frame.
                warn!(error = %e, "Skipping non-UTF-8 stream line");
                continue;
            }
        };
        if let Some(payload) = line.strip_prefix("data:") {
            let payload = payload.trim();
            if !payload.is_empty() {
                payloads.push(payload.to_string());
            }
        }
    }

    payloads
}
