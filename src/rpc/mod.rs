//! JSON-RPC module for daemon communication.
//!
//! Provides the JSON-RPC 2.0 server implementation for:
//! - `begin_request`: Start a tagged generation for a slot
//! - `publish_audio`: Encode a base64 PCM payload and publish it as WAV
//! - `publish_blob`: Publish an already-containerized result (e.g. video)
//! - `clear`: Revoke a slot's handle
//! - `get_slots`: List live handles
//! - `inspect`: Read back the header of a published WAV
//! - `ping`: Health check
//! - `shutdown`: Graceful shutdown
//!
//! Notifications:
//! - `handle_revoked`: A slot's previous handle was released

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use server::{run_server, serve, ServerState};
pub use types::{
    HandleRevokedParams, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, PublishResult, PublishStatus, RequestId,
};
