//! JSON-RPC server over stdin/stdout.
//!
//! Implements the JSON-RPC 2.0 protocol for daemon communication. Requests
//! are handled one at a time, so manager calls are always sequenced.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use crate::lifecycle::{ObjectUrlRegistry, ResourceManager};

use super::methods::handle_request;
use super::types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    JSONRPC_VERSION,
};

/// State shared across all request handlers.
pub struct ServerState {
    /// Slot manager owning every published handle.
    pub manager: ResourceManager<Box<dyn ObjectUrlRegistry>>,
    /// Daemon configuration.
    pub config: DaemonConfig,
    /// Notifications queued while handling the current request.
    outbox: Vec<String>,
    /// Flag to signal server shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ServerState {
    /// Creates new server state with the registry selected by `config`.
    pub fn new(config: DaemonConfig) -> Self {
        let registry = config.build_registry();
        Self::with_registry(config, registry)
    }

    /// Creates new server state backed by `registry`.
    pub fn with_registry(config: DaemonConfig, registry: Box<dyn ObjectUrlRegistry>) -> Self {
        Self {
            manager: ResourceManager::new(registry),
            config,
            outbox: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queues a notification to be written after the current response.
    pub fn notify<T: serde::Serialize>(&mut self, method: &'static str, params: T) {
        let notification = JsonRpcNotification::new(method, params);
        match serde_json::to_string(&notification) {
            Ok(json) => self.outbox.push(json),
            Err(e) => tracing::error!(method, error = %e, "failed to serialize notification"),
        }
    }

    /// Takes all queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    /// Signals the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
pub fn run_server(state: ServerState) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(stdin.lock(), stdout.lock(), state)
}

/// Serves line-delimited JSON-RPC requests from `reader`, writing responses
/// and notifications to `writer`.
///
/// Every live handle is revoked when the loop ends.
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W, mut state: ServerState) -> Result<()> {
    tracing::info!(store = %state.config.store, "JSON-RPC server started, waiting for requests");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "error reading request stream");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = process_request(&line, &mut state);

        if let Some(response) = response {
            writeln!(writer, "{}", response)
                .map_err(|e| DaemonError::io("Failed to write response", e))?;
        }
        for notification in state.drain_notifications() {
            writeln!(writer, "{}", notification)
                .map_err(|e| DaemonError::io("Failed to write notification", e))?;
        }
        writer
            .flush()
            .map_err(|e| DaemonError::io("Failed to flush output", e))?;

        if state.is_shutdown() {
            tracing::info!("server shutdown requested");
            break;
        }
    }

    state.manager.clear_all();
    tracing::info!("JSON-RPC server stopped");
    Ok(())
}

/// Processes a single JSON-RPC request line.
fn process_request(line: &str, state: &mut ServerState) -> Option<String> {
    // Parse JSON
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return Some(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    // Validate JSON-RPC version
    if request.jsonrpc != JSONRPC_VERSION {
        let error = JsonRpcErrorResponse::new(
            Some(request.id),
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return Some(serde_json::to_string(&error).unwrap_or_default());
    }

    tracing::debug!(method = %request.method, "handling request");
    let result = handle_request(&request.method, request.params, state);

    match result {
        Ok(response) => {
            let response = JsonRpcResponse::new(request.id, response);
            Some(serde_json::to_string(&response).unwrap_or_default())
        }
        Err(error) => Some(
            serde_json::to_string(&JsonRpcErrorResponse::new(Some(request.id), error))
                .unwrap_or_default(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::MemoryRegistry;

    fn test_state() -> ServerState {
        ServerState::with_registry(DaemonConfig::default(), Box::new(MemoryRegistry::new()))
    }

    fn run_lines(input: &str) -> Vec<serde_json::Value> {
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, test_state()).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn server_state_shutdown() {
        let state = test_state();
        assert!(!state.is_shutdown());
        state.shutdown();
        assert!(state.is_shutdown());
    }

    #[test]
    fn process_invalid_json() {
        let mut state = test_state();
        let response = process_request("not json", &mut state).unwrap();
        assert!(response.contains("-32700")); // Parse error
    }

    #[test]
    fn process_invalid_version() {
        let mut state = test_state();
        let request = r#"{"jsonrpc":"1.0","method":"ping","id":1}"#;
        let response = process_request(request, &mut state).unwrap();
        assert!(response.contains("-32600")); // Invalid request
    }

    #[test]
    fn process_unknown_method() {
        let mut state = test_state();
        let request = r#"{"jsonrpc":"2.0","method":"unknown","id":1}"#;
        let response = process_request(request, &mut state).unwrap();
        assert!(response.contains("-32601")); // Method not found
    }

    #[test]
    fn success_response_echoes_id() {
        let mut state = test_state();

        let request = r#"{"jsonrpc":"2.0","method":"ping","id":"abc"}"#;
        let response: serde_json::Value =
            serde_json::from_str(&process_request(request, &mut state).unwrap()).unwrap();
        assert_eq!(response["jsonrpc"], JSONRPC_VERSION);
        assert_eq!(response["id"], "abc");
        assert_eq!(response["result"]["status"], "ok");
        assert!(response.get("error").is_none());

        let request = r#"{"jsonrpc":"2.0","method":"ping","id":7}"#;
        let response: serde_json::Value =
            serde_json::from_str(&process_request(request, &mut state).unwrap()).unwrap();
        assert_eq!(response["id"], 7);
    }

    #[test]
    fn serve_stops_after_shutdown() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"ping","id":1}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"shutdown","id":2}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"ping","id":3}"#,
            "\n",
        );
        let responses = run_lines(input);

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["status"], "ok");
        assert_eq!(responses[1]["result"]["status"], "shutting_down");
    }

    #[test]
    fn serve_emits_revoke_notification_after_response() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"publish_audio","id":1,"params":{"slot":"speech","audio_b64":"AAAAAA=="}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"publish_audio","id":2,"params":{"slot":"speech","audio_b64":"AQABAA=="}}"#,
            "\n",
        );
        let lines = run_lines(input);

        assert_eq!(lines.len(), 3);
        let first_url = lines[0]["result"]["handle"]["url"].as_str().unwrap();
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[2]["method"], "handle_revoked");
        assert_eq!(lines[2]["params"]["url"], first_url);
        assert_eq!(lines[2]["params"]["slot"], "speech");
    }
}
