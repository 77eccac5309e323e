//! JSON-RPC method handlers.
//!
//! Implements the handlers for all supported JSON-RPC methods.

use serde::de::DeserializeOwned;

use crate::audio::{decode_base64, WavHeader};
use crate::error::DaemonError;
use crate::generation::{default_file_name, speech_blob};
use crate::types::{Blob, PlayableAudioHandle, RequestToken};

use super::server::ServerState;
use super::types::{
    validate_slot, BeginRequestResult, ClearResult, GetSlotsResult, HandleRevokedParams,
    InspectParams, InspectResult, JsonRpcError, PublishAudioParams, PublishBlobParams,
    PublishResult, PublishStatus, SlotParams,
};

/// Handles a JSON-RPC method call.
pub fn handle_request(
    method: &str,
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    match method {
        "begin_request" => handle_begin_request(params, state),
        "publish_audio" => handle_publish_audio(params, state),
        "publish_blob" => handle_publish_blob(params, state),
        "clear" => handle_clear(params, state),
        "get_slots" => handle_get_slots(state),
        "inspect" => handle_inspect(params, state),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to serialize result: {}", e)))
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({ "status": "ok" }))
}

/// Handles the shutdown method.
fn handle_shutdown(state: &mut ServerState) -> Result<serde_json::Value, JsonRpcError> {
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the begin_request method.
///
/// The returned token must accompany the matching publish so a slower,
/// superseded response can be dropped.
fn handle_begin_request(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: SlotParams = parse_params(params)?;
    validate_slot(&params.slot)?;

    let token = state.manager.begin_request(&params.slot);
    to_value(BeginRequestResult {
        slot: token.slot,
        token: token.generation,
    })
}

/// Handles the publish_audio method: base64 PCM in, WAV handle out.
fn handle_publish_audio(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: PublishAudioParams = parse_params(params)?;
    validate_slot(&params.slot)?;

    let token = params.token.map(|generation| RequestToken {
        slot: params.slot.clone(),
        generation,
    });
    if let Some(ref token) = token {
        if state.manager.discard_if_stale(token) {
            return to_value(stale_result());
        }
    }

    let format = params.format(state.config.default_format);
    let file_name = params
        .file_name
        .clone()
        .unwrap_or_else(|| default_file_name(&params.slot));

    // Failures here leave the slot's current result untouched
    let blob = speech_blob(&params.audio_b64, &format, &file_name)?;

    publish(state, &params.slot, token.as_ref(), blob)
}

/// Handles the publish_blob method for already-containerized results.
fn handle_publish_blob(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: PublishBlobParams = parse_params(params)?;
    validate_slot(&params.slot)?;

    if params.mime_type.trim().is_empty() {
        return Err(JsonRpcError::invalid_params("mime_type cannot be empty"));
    }

    let token = params.token.map(|generation| RequestToken {
        slot: params.slot.clone(),
        generation,
    });
    if let Some(ref token) = token {
        if state.manager.discard_if_stale(token) {
            return to_value(stale_result());
        }
    }

    let data = decode_base64(&params.data_b64)?;
    if data.is_empty() {
        return Err(DaemonError::empty_input().into());
    }

    let file_name = params.file_name.unwrap_or_else(|| {
        format!(
            "{}.{}",
            params.slot,
            crate::types::extension_for_mime(&params.mime_type)
        )
    });
    let blob = Blob::new(data.into_bytes(), params.mime_type, file_name);

    publish(state, &params.slot, token.as_ref(), blob)
}

/// Publishes into a slot and queues a revoke notification for the handle
/// it replaced.
fn publish(
    state: &mut ServerState,
    slot: &str,
    token: Option<&RequestToken>,
    blob: Blob,
) -> Result<serde_json::Value, JsonRpcError> {
    let previous = state.manager.current(slot).map(|h| h.url.clone());

    let handle = match token {
        Some(token) => state.manager.publish_if_current(token, blob)?,
        None => Some(state.manager.publish(slot, blob)?),
    };

    let Some(handle) = handle else {
        return to_value(stale_result());
    };

    if let Some(url) = previous {
        state.notify(
            "handle_revoked",
            HandleRevokedParams {
                slot: slot.to_string(),
                url,
            },
        );
    }

    to_value(published_result(handle))
}

fn published_result(handle: PlayableAudioHandle) -> PublishResult {
    PublishResult {
        status: PublishStatus::Published,
        handle: Some(handle),
    }
}

fn stale_result() -> PublishResult {
    PublishResult {
        status: PublishStatus::Stale,
        handle: None,
    }
}

/// Handles the clear method.
fn handle_clear(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: SlotParams = parse_params(params)?;
    validate_slot(&params.slot)?;

    let cleared = state.manager.clear(&params.slot);
    to_value(ClearResult {
        slot: params.slot,
        cleared,
    })
}

/// Handles the get_slots method.
fn handle_get_slots(state: &ServerState) -> Result<serde_json::Value, JsonRpcError> {
    to_value(GetSlotsResult {
        slots: state.manager.handles().cloned().collect(),
        store: state.config.store.as_str().to_string(),
    })
}

/// Handles the inspect method: reads back the header of a published WAV.
fn handle_inspect(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: InspectParams = parse_params(params)?;

    let blob = state
        .manager
        .resolve(&params.url)
        .ok_or_else(|| DaemonError::url_not_found(&params.url))?;
    let header = WavHeader::parse(blob.bytes())?;

    to_value(InspectResult {
        url: params.url,
        sample_rate: header.format.sample_rate,
        channels: header.format.channels,
        bits_per_sample: header.format.bits_per_sample,
        data_len: header.data_len,
        duration_sec: crate::audio::samples_to_duration(header.data_len as usize, &header.format),
    })
}
