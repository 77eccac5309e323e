//! Result pipeline for generated speech.
//!
//! Takes the base64 audio payload of a speech-synthesis response through
//! decoding, WAV encoding and publication into a slot. Any failure happens
//! before the manager is touched, so the slot's previous result stays live.

use crate::audio::{decode_base64, encode_wav};
use crate::error::Result;
use crate::lifecycle::{ObjectUrlRegistry, ResourceManager};
use crate::types::{AudioFormat, Blob, PlayableAudioHandle, RequestToken};

/// Decodes and encodes a speech payload into a publishable WAV blob.
///
/// # Arguments
///
/// * `audio_b64` - Base64 PCM payload from the synthesis API
/// * `format` - Format of the decoded PCM (24 kHz mono 16-bit for speech)
/// * `file_name` - Download name, e.g. `audiobook.wav`
pub fn speech_blob(audio_b64: &str, format: &AudioFormat, file_name: &str) -> Result<Blob> {
    let samples = decode_base64(audio_b64)?;
    let container = encode_wav(samples.as_bytes(), format)?;

    tracing::debug!(
        frames = samples.frame_count(format),
        bytes = container.len(),
        file_name,
        "built speech blob"
    );

    Ok(container.into_blob(file_name))
}

/// Publishes a speech payload into `slot`.
///
/// # Example
///
/// ```ignore
/// use wavslot::generation::publish_speech;
/// use wavslot::lifecycle::{MemoryRegistry, ResourceManager};
/// use wavslot::types::AudioFormat;
///
/// let mut manager = ResourceManager::new(MemoryRegistry::new());
/// let handle = publish_speech(&mut manager, "podcast", payload, &AudioFormat::SPEECH, "podcast.wav")?;
/// ```
pub fn publish_speech<R: ObjectUrlRegistry>(
    manager: &mut ResourceManager<R>,
    slot: &str,
    audio_b64: &str,
    format: &AudioFormat,
    file_name: &str,
) -> Result<PlayableAudioHandle> {
    let blob = speech_blob(audio_b64, format, file_name)?;
    manager.publish(slot, blob)
}

/// Publishes a speech payload for a tagged request.
///
/// Stale requests return `Ok(None)` without decoding the payload.
pub fn publish_speech_if_current<R: ObjectUrlRegistry>(
    manager: &mut ResourceManager<R>,
    token: &RequestToken,
    audio_b64: &str,
    format: &AudioFormat,
    file_name: &str,
) -> Result<Option<PlayableAudioHandle>> {
    if manager.discard_if_stale(token) {
        return Ok(None);
    }

    let blob = speech_blob(audio_b64, format, file_name)?;
    manager.publish_if_current(token, blob)
}

/// Default download name for a slot.
pub fn default_file_name(slot: &str) -> String {
    format!("{}.wav", slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{encode_base64, WavHeader};
    use crate::error::ErrorCode;
    use crate::lifecycle::MemoryRegistry;

    #[test]
    fn speech_blob_wraps_payload() {
        let payload = encode_base64(&[0u8; 100]);
        let blob = speech_blob(&payload, &AudioFormat::SPEECH, "speech.wav").unwrap();

        assert_eq!(blob.len(), 144);
        assert_eq!(blob.mime_type(), "audio/wav");
        assert_eq!(blob.file_name(), "speech.wav");

        let header = WavHeader::parse(blob.bytes()).unwrap();
        assert_eq!(header.format, AudioFormat::SPEECH);
        assert_eq!(header.data_len, 100);
    }

    #[test]
    fn failed_decode_keeps_previous_result() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let good = encode_base64(&[0u8; 4]);
        let first = publish_speech(&mut manager, "speech", &good, &AudioFormat::SPEECH, "speech.wav")
            .unwrap();

        let err = publish_speech(&mut manager, "speech", "@@@@", &AudioFormat::SPEECH, "speech.wav")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
        assert_eq!(manager.current("speech"), Some(&first));
    }

    #[test]
    fn empty_payload_keeps_previous_result() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let first = publish_speech(
            &mut manager,
            "speech",
            &encode_base64(&[0u8; 4]),
            &AudioFormat::SPEECH,
            "speech.wav",
        )
        .unwrap();

        let err = publish_speech(&mut manager, "speech", "", &AudioFormat::SPEECH, "speech.wav")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyInput);
        assert_eq!(manager.current("speech"), Some(&first));
        assert_eq!(manager.stats().revoked, 0);
    }

    #[test]
    fn stale_request_skips_decoding() {
        let mut manager = ResourceManager::new(MemoryRegistry::new());
        let old = manager.begin_request("speech");
        manager.begin_request("speech");

        // Payload is invalid, but a stale request never looks at it
        let result =
            publish_speech_if_current(&mut manager, &old, "@@@@", &AudioFormat::SPEECH, "speech.wav")
                .unwrap();
        assert!(result.is_none());
        assert_eq!(manager.stats().stale_discarded, 1);
    }

    #[test]
    fn default_file_name_uses_slot() {
        assert_eq!(default_file_name("audiobook"), "audiobook.wav");
    }
}
