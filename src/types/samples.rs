//! RawAudioSamples type wrapping headerless linear PCM.

use bytes::Bytes;

use super::format::AudioFormat;

/// An immutable buffer of headerless linear PCM bytes.
///
/// Produced by decoding the base64 payload of a speech-synthesis response
/// and consumed by the WAV encoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAudioSamples {
    bytes: Bytes,
}

impl RawAudioSamples {
    /// Wraps the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning the underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of frames (one sample per channel) under `format`.
    ///
    /// Trailing bytes that do not make up a whole frame are not counted.
    pub fn frame_count(&self, format: &AudioFormat) -> usize {
        match format.block_align() {
            Some(align) if align > 0 => self.bytes.len() / align as usize,
            _ => 0,
        }
    }
}

impl AsRef<[u8]> for RawAudioSamples {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for RawAudioSamples {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
