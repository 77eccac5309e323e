//! Audio encoding module.
//!
//! Provides base64 payload decoding and PCM to WAV container encoding.

pub mod payload;
pub mod wav;

// Re-export commonly used items
pub use payload::{decode_base64, encode_base64};
pub use wav::{
    encode_wav, probe, samples_to_duration, write_wav, WavContainer, WavHeader, WavInfo,
    HEADER_LEN,
};
