//! Base64 re-encoding of binary payloads in fixed-width lines.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::MAX_LINE_WIDTH;

/// Encodes `raw` as padded base64 and cuts it into 76-character lines.
/// Only the last line may be shorter; empty input gives no lines.
pub fn chunk_base64(raw: &[u8]) -> Vec<String> {
    let encoded = BASE64.encode(raw);
    // base64 output is pure ASCII, so byte chunks are char chunks
    encoded
        .as_bytes()
        .chunks(MAX_LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}
