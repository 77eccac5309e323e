//! Blob type for generated media results.
//!
//! A Blob is an immutable binary result (a WAV container, a generated
//! video, ...) together with the MIME type and download name a playback
//! or download sink needs.

use bytes::Bytes;
use sha2::{Digest, Sha256};

/// MIME type of WAV containers produced by the encoder.
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// An immutable binary result ready to be published to a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    mime_type: String,
    file_name: String,
    digest: String,
}

impl Blob {
    /// Creates a new Blob, computing its content digest.
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let digest = compute_digest(&bytes);
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
            digest,
        }
    }

    /// Returns the blob contents.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the blob has no contents.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type, e.g. `audio/wav`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Suggested download file name, e.g. `speech.wav`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// First 16 hex characters of the SHA256 of the contents.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// File extension matching the MIME type, without the dot.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Maps a MIME type to a file extension for stored blobs.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        _ => "bin",
    }
}

/// Computes a content digest for a blob.
///
/// The digest is the first 16 hex characters of the SHA256 hash, the same
/// width used for stored file names.
pub fn compute_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
