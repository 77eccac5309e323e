//! AudioFormat type describing headerless PCM payloads.
//!
//! The format is always supplied by the caller from the known contract of
//! the synthesis API; it is never inferred from the bytes themselves.

use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, Result};

/// Bit depths the encoder can frame.
pub const SUPPORTED_BITS_PER_SAMPLE: [u16; 3] = [8, 16, 32];

/// How to interpret a buffer of raw linear PCM bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Samples per second per channel, in Hz.
    pub sample_rate: u32,

    /// Number of interleaved channels.
    pub channels: u16,

    /// Bits per sample (8, 16 or 32).
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Output format of the speech-synthesis API: 24 kHz, mono, 16-bit.
    pub const SPEECH: AudioFormat = AudioFormat {
        sample_rate: 24000,
        channels: 1,
        bits_per_sample: 16,
    };

    /// Creates a new AudioFormat. Call [`AudioFormat::validate`] before use.
    pub const fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Bytes per sample for a single channel.
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame (one sample for every channel).
    ///
    /// Returns `None` if the value does not fit the 16-bit header field.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bytes_per_sample())
    }

    /// Bytes per second of audio.
    ///
    /// Returns `None` if the value does not fit the 32-bit header field.
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(self.block_align()? as u32)
    }

    /// Checks that this format can be written to a WAV header.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(DaemonError::invalid_format("sample rate must be > 0"));
        }

        if self.channels < 1 {
            return Err(DaemonError::invalid_format("channel count must be >= 1"));
        }

        if !SUPPORTED_BITS_PER_SAMPLE.contains(&self.bits_per_sample) {
            return Err(DaemonError::invalid_format(format!(
                "unsupported bits per sample: {} (expected 8, 16 or 32)",
                self.bits_per_sample
            )));
        }

        if self.block_align().is_none() {
            return Err(DaemonError::invalid_format(format!(
                "block align overflows for {} channels",
                self.channels
            )));
        }

        if self.byte_rate().is_none() {
            return Err(DaemonError::invalid_format(format!(
                "byte rate overflows for {} Hz x {} channels",
                self.sample_rate, self.channels
            )));
        }

        Ok(())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}
