//! JSON-RPC types for the daemon protocol.

use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, ErrorCode};
use crate::types::{AudioFormat, PlayableAudioHandle};

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Maximum slot name length in characters.
pub const MAX_SLOT_LEN: usize = 128;

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

/// A JSON-RPC request wrapper.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application-specific errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<String>,
}

impl JsonRpcError {
    /// Creates a parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a method not found error (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    /// Creates an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }

    /// Returns the application error code (-32010 and below) for `code`.
    pub fn code_for(code: ErrorCode) -> i32 {
        match code {
            ErrorCode::InvalidFormat => -32010,
            ErrorCode::EmptyInput => -32011,
            ErrorCode::MalformedInput => -32012,
            ErrorCode::SlotNotFound => -32013,
            ErrorCode::Io => -32014,
        }
    }
}

impl From<DaemonError> for JsonRpcError {
    fn from(err: DaemonError) -> Self {
        Self {
            code: Self::code_for(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.message),
                recovery: Some(err.code.recovery_hint().to_string()),
            }),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Parameters naming a slot.
#[derive(Debug, Deserialize)]
pub struct SlotParams {
    pub slot: String,
}

/// Parameters for `publish_audio`.
#[derive(Debug, Deserialize)]
pub struct PublishAudioParams {
    /// Target slot, e.g. `podcast-audio-result`.
    pub slot: String,

    /// Base64 PCM payload from the speech API.
    pub audio_b64: String,

    /// Overrides for the daemon's default PCM format.
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub bits_per_sample: Option<u16>,

    /// Download name; defaults to `<slot>.wav`.
    pub file_name: Option<String>,

    /// Generation returned by `begin_request`; the publish is dropped if it
    /// has been superseded.
    pub token: Option<u64>,
}

impl PublishAudioParams {
    /// Returns the PCM format, filling unset fields from `default`.
    pub fn format(&self, default: AudioFormat) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate.unwrap_or(default.sample_rate),
            channels: self.channels.unwrap_or(default.channels),
            bits_per_sample: self.bits_per_sample.unwrap_or(default.bits_per_sample),
        }
    }
}

/// Parameters for `publish_blob`, used for already-containerized results
/// such as generated video.
#[derive(Debug, Deserialize)]
pub struct PublishBlobParams {
    pub slot: String,
    pub data_b64: String,
    pub mime_type: String,
    pub file_name: Option<String>,
    pub token: Option<u64>,
}

/// Parameters for `inspect`.
#[derive(Debug, Deserialize)]
pub struct InspectParams {
    pub url: String,
}

/// Checks a slot name from a request.
pub fn validate_slot(slot: &str) -> Result<(), JsonRpcError> {
    if slot.trim().is_empty() {
        return Err(JsonRpcError::invalid_params("Slot cannot be empty"));
    }
    if slot.chars().count() > MAX_SLOT_LEN {
        return Err(JsonRpcError::invalid_params(format!(
            "Slot too long: {} characters (max {})",
            slot.chars().count(),
            MAX_SLOT_LEN
        )));
    }
    Ok(())
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a publish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// The blob is live in the slot.
    Published,
    /// The request token was superseded; nothing changed.
    Stale,
}

/// Response for `publish_audio` and `publish_blob`.
#[derive(Debug, Serialize)]
pub struct PublishResult {
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<PlayableAudioHandle>,
}

/// Response for `begin_request`.
#[derive(Debug, Serialize)]
pub struct BeginRequestResult {
    pub slot: String,
    pub token: u64,
}

/// Response for `clear`.
#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub slot: String,
    pub cleared: bool,
}

/// Response for `get_slots`.
#[derive(Debug, Serialize)]
pub struct GetSlotsResult {
    pub slots: Vec<PlayableAudioHandle>,
    pub store: String,
}

/// Response for `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    pub url: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
    pub duration_sec: f32,
}

// ============================================================================
// Notifications
// ============================================================================

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Sent after a slot's previous handle has been revoked.
#[derive(Debug, Serialize)]
pub struct HandleRevokedParams {
    pub slot: String,
    pub url: String,
}
