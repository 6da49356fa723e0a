//! Decoding raw file bytes into the payload shape the table producer expects.
//!
//! - Columnar binary and delimited text pass through unchanged. Delimiter, quoting and header
//!   handling are left to the producer.
//! - JSON is decoded as UTF-8 (lossily, like a browser `TextDecoder`) and parsed locally, so a
//!   syntax error aborts the candidate before any table is requested.

use crate::error::DecodeError;
use crate::types::LoadablePayload;

use super::classify::DecodeStrategy;

const UTF8_BOM: char = '\u{feff}';

/// Convert raw bytes into a [`LoadablePayload`] according to `strategy`.
///
/// Deterministic: the same bytes and strategy always give equal payloads.
pub fn decode(bytes: Vec<u8>, strategy: DecodeStrategy) -> Result<LoadablePayload, DecodeError> {
    match strategy {
        DecodeStrategy::ColumnarBinary | DecodeStrategy::DelimitedText => {
            Ok(LoadablePayload::Bytes(bytes))
        }
        DecodeStrategy::Json => decode_json(&bytes).map(LoadablePayload::Structured),
    }
}

fn decode_json(bytes: &[u8]) -> Result<serde_json::Value, DecodeError> {
    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded.strip_prefix(UTF8_BOM).unwrap_or(&decoded);
    Ok(serde_json::from_str(text)?)
}
