//! Handle types binding published blobs to slots.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A live, revocable reference to a published blob.
///
/// Exactly one handle is live per slot at a time. The `url` is what a
/// playback or download sink addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableAudioHandle {
    /// Revocable reference, e.g. `blob:wavslot/00000000000000a1`.
    pub url: String,

    /// Logical result slot owning this handle, e.g. `podcast-audio-result`.
    pub slot: String,

    /// MIME type of the referenced blob.
    pub mime_type: String,

    /// Size of the referenced blob in bytes.
    pub byte_len: usize,

    /// Suggested download file name.
    pub file_name: String,

    /// Content digest of the referenced blob.
    pub digest: String,

    /// When the handle was created.
    #[serde(with = "system_time_serde")]
    pub created_at: SystemTime,
}

/// Ticket for an asynchronous generation targeting a slot.
///
/// A response carrying a token whose generation is no longer the slot's
/// latest must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken {
    /// Slot the request will publish into.
    pub slot: String,

    /// Generation number at the time the request started.
    pub generation: u64,
}

/// Custom serde implementation for SystemTime as a Unix timestamp.
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
