//! wavslot: PCM-to-WAV encoding and revocable result slots for generated
//! speech.
//!
//! A speech-synthesis API returns headerless PCM as base64. This library
//! decodes that payload, frames it in a standard WAV container, and
//! publishes the result into a logical slot as a revocable handle. Each slot
//! holds at most one live handle; a replacement is created before the old
//! handle is revoked, and responses of superseded requests are dropped.
//!
//! # Modules
//!
//! - [`types`]: Core data types (AudioFormat, RawAudioSamples, Blob, PlayableAudioHandle)
//! - [`audio`]: Base64 decoding and WAV encoding
//! - [`lifecycle`]: Object-URL registries and the slot manager
//! - [`generation`]: Decode, encode and publish pipeline
//! - [`config`]: Runtime configuration (DaemonConfig, StoreKind)
//! - [`rpc`]: JSON-RPC daemon over stdio
//! - [`error`]: Error types and codes (DaemonError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use wavslot::{
//!     audio::encode_wav,
//!     generation::publish_speech,
//!     lifecycle::{MemoryRegistry, ResourceManager},
//!     types::AudioFormat,
//! };
//!
//! let mut manager = ResourceManager::new(MemoryRegistry::new());
//!
//! // Each regeneration replaces the slot's handle; the old one is revoked
//! let handle = publish_speech(&mut manager, "podcast", &payload, &AudioFormat::SPEECH, "podcast.wav")?;
//! player.set_source(&handle.url);
//!
//! // Teardown
//! manager.clear("podcast");
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod lifecycle;
pub mod rpc;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use audio::{decode_base64, encode_wav, WavContainer, WavHeader};
pub use config::{DaemonConfig, StoreKind};
pub use error::{DaemonError, ErrorCode, Result};
pub use lifecycle::{MemoryRegistry, ObjectUrlRegistry, ResourceManager};
pub use types::{AudioFormat, Blob, PlayableAudioHandle, RawAudioSamples, RequestToken};
