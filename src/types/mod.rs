//! Core types for wavslot.
//!
//! This module re-exports all the core data types:
//! - [`AudioFormat`]: How to interpret headerless PCM bytes
//! - [`RawAudioSamples`]: Decoded PCM payload from the speech API
//! - [`Blob`]: An immutable binary result with MIME type and download name
//! - [`PlayableAudioHandle`]: A live, revocable reference bound to a slot
//! - [`RequestToken`]: Ticket used to discard stale generation responses

mod blob;
mod format;
mod handle;
mod samples;

// Re-export all types at the module level
pub use blob::{compute_digest, extension_for_mime, Blob, WAV_MIME_TYPE};
pub use format::{AudioFormat, SUPPORTED_BITS_PER_SAMPLE};
pub use handle::{PlayableAudioHandle, RequestToken};
pub use samples::RawAudioSamples;
