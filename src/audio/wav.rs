//! PCM to WAV container encoding.
//!
//! Wraps headerless linear PCM bytes in the canonical 44-byte RIFF/WAVE
//! header, and reads that header back for verification. Every size field
//! is computed from the actual payload length.

use std::io::Cursor;
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DaemonError, Result};
use crate::types::{AudioFormat, Blob, WAV_MIME_TYPE};

/// Size of the canonical RIFF/WAVE header in bytes.
pub const HEADER_LEN: usize = 44;

/// Size of the PCM `fmt ` chunk body.
const FMT_CHUNK_LEN: u32 = 16;

/// Format tag for uncompressed PCM.
const FORMAT_PCM: u16 = 1;

/// Largest payload whose RIFF size (`36 + n`) still fits in 32 bits.
pub const MAX_DATA_LEN: usize = (u32::MAX - 36) as usize;

/// A complete WAV file: 44-byte header followed by the sample bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Bytes,
    format: AudioFormat,
}

impl WavContainer {
    /// Returns the full file contents.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the format written into the header.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Total length including the header.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// A container always carries a header.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the sample bytes after the header.
    pub fn data(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Wraps the container as a publishable blob.
    pub fn into_blob(self, file_name: impl Into<String>) -> Blob {
        Blob::new(self.bytes, WAV_MIME_TYPE, file_name)
    }
}

/// Encodes raw PCM bytes into a WAV container.
///
/// # Arguments
///
/// * `samples` - Headerless linear PCM, interleaved if multi-channel
/// * `format` - Sample rate, channel count and bit depth of `samples`
///
/// # Errors
///
/// * `INVALID_FORMAT` if the format is unusable, the payload is not made of
///   whole frames, or it is too large to be framed
/// * `EMPTY_INPUT` if `samples` is empty
///
/// # Example
///
/// ```ignore
/// use wavslot::audio::encode_wav;
/// use wavslot::types::AudioFormat;
///
/// let wav = encode_wav(&[0u8; 100], &AudioFormat::SPEECH)?;
/// assert_eq!(wav.len(), 144);
/// ```
pub fn encode_wav(samples: &[u8], format: &AudioFormat) -> Result<WavContainer> {
    format.validate()?;

    if samples.is_empty() {
        return Err(DaemonError::empty_input());
    }

    // validate() guarantees both fit their fields
    let block_align = format
        .block_align()
        .ok_or_else(|| DaemonError::invalid_format("block align overflow"))?;
    let byte_rate = format
        .byte_rate()
        .ok_or_else(|| DaemonError::invalid_format("byte rate overflow"))?;

    if samples.len() % block_align as usize != 0 {
        return Err(DaemonError::invalid_format(format!(
            "payload of {} bytes is not a whole number of {}-byte frames",
            samples.len(),
            block_align
        )));
    }

    if samples.len() > MAX_DATA_LEN {
        return Err(DaemonError::invalid_format(format!(
            "payload of {} bytes exceeds the RIFF size limit",
            samples.len()
        )));
    }
    let data_len = samples.len() as u32;

    let mut buffer = BytesMut::with_capacity(HEADER_LEN + samples.len());

    // RIFF header
    buffer.put_slice(b"RIFF");
    buffer.put_u32_le(36 + data_len);
    buffer.put_slice(b"WAVE");

    // fmt chunk
    buffer.put_slice(b"fmt ");
    buffer.put_u32_le(FMT_CHUNK_LEN);
    buffer.put_u16_le(FORMAT_PCM);
    buffer.put_u16_le(format.channels);
    buffer.put_u32_le(format.sample_rate);
    buffer.put_u32_le(byte_rate);
    buffer.put_u16_le(block_align);
    buffer.put_u16_le(format.bits_per_sample);

    // data chunk
    buffer.put_slice(b"data");
    buffer.put_u32_le(data_len);
    buffer.put_slice(samples);

    tracing::debug!(
        data_len,
        %format,
        "encoded WAV container"
    );

    Ok(WavContainer {
        bytes: buffer.freeze(),
        format: *format,
    })
}

/// Parsed view of a canonical 44-byte WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// Format fields from the `fmt ` chunk.
    pub format: AudioFormat,
    /// RIFF chunk size (file size minus 8).
    pub riff_len: u32,
    /// Declared `data` chunk size.
    pub data_len: u32,
    /// Declared byte rate.
    pub byte_rate: u32,
    /// Declared block alignment.
    pub block_align: u16,
}

impl WavHeader {
    /// Parses and checks the canonical header at the start of `bytes`.
    ///
    /// Only the 44-byte layout written by [`encode_wav`] is accepted. Size
    /// fields must agree with the buffer length and the rate fields with
    /// the format.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(DaemonError::malformed_input(format!(
                "WAV header needs {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_len = read_u32(bytes, 16);
        if fmt_len != FMT_CHUNK_LEN {
            return Err(DaemonError::malformed_input(format!(
                "unexpected fmt chunk size {}",
                fmt_len
            )));
        }

        let tag = read_u16(bytes, 20);
        if tag != FORMAT_PCM {
            return Err(DaemonError::malformed_input(format!(
                "format tag {} is not PCM",
                tag
            )));
        }

        let header = WavHeader {
            format: AudioFormat {
                channels: read_u16(bytes, 22),
                sample_rate: read_u32(bytes, 24),
                bits_per_sample: read_u16(bytes, 34),
            },
            riff_len: read_u32(bytes, 4),
            data_len: read_u32(bytes, 40),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
        };

        let payload_len = bytes.len() - HEADER_LEN;
        if header.data_len as usize != payload_len {
            return Err(DaemonError::malformed_input(format!(
                "data chunk declares {} bytes but {} follow the header",
                header.data_len, payload_len
            )));
        }

        if header.riff_len as u64 != 36 + header.data_len as u64 {
            return Err(DaemonError::malformed_input(format!(
                "RIFF size {} does not match data size {}",
                header.riff_len, header.data_len
            )));
        }

        if Some(header.byte_rate) != header.format.byte_rate()
            || Some(header.block_align) != header.format.block_align()
        {
            return Err(DaemonError::malformed_input(
                "byte rate or block align disagree with the format",
            ));
        }

        Ok(header)
    }
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<()> {
    if &bytes[offset..offset + 4] != tag {
        return Err(DaemonError::malformed_input(format!(
            "expected {:?} at byte {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// What a standard decoder reports for a WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Format as read by the decoder.
    pub format: AudioFormat,
    /// Frames per channel.
    pub frames: u32,
    /// Playback length in seconds.
    pub duration_sec: f32,
}

/// Opens `bytes` with the hound decoder to confirm the file is playable.
pub fn probe(bytes: &[u8]) -> Result<WavInfo> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| {
        DaemonError::malformed_input(format!("WAV decoder rejected the file: {}", e))
    })?;

    let spec = reader.spec();
    let frames = reader.duration();

    Ok(WavInfo {
        format: AudioFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        },
        frames,
        duration_sec: frames as f32 / spec.sample_rate as f32,
    })
}

/// Writes a container to a WAV file on disk.
pub fn write_wav(container: &WavContainer, path: &Path) -> Result<()> {
    std::fs::write(path, container.bytes()).map_err(|e| {
        DaemonError::io(format!("Failed to write WAV file {}", path.display()), e)
    })
}

/// Calculates the duration in seconds of `byte_len` bytes of PCM in `format`.
pub fn samples_to_duration(byte_len: usize, format: &AudioFormat) -> f32 {
    match format.byte_rate() {
        Some(rate) if rate > 0 => byte_len as f32 / rate as f32,
        _ => 0.0,
    }
}
