//! Base64 payload decoding.
//!
//! The speech API returns audio as a standard base64 string (with `=`
//! padding, no URL-safe alphabet, no line breaks).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{DaemonError, Result};
use crate::types::RawAudioSamples;

/// Decodes a standard base64 string into raw PCM bytes.
///
/// Surrounding ASCII whitespace is ignored; whitespace inside the payload
/// is rejected like any other invalid character.
pub fn decode_base64(input: &str) -> Result<RawAudioSamples> {
    STANDARD
        .decode(input.trim_matches(|c: char| c.is_ascii_whitespace()))
        .map(RawAudioSamples::from)
        .map_err(|e| DaemonError::malformed_input(format!("invalid base64: {}", e)))
}

/// Encodes bytes as a standard padded base64 string.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
