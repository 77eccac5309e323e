//! Error types for wavslot.
//!
//! Defines all error codes and types used by the encoder, the base64
//! decoder and the slot lifecycle manager for consistent error handling
//! and reporting.

use std::fmt;

/// Error codes returned in error responses.
///
/// These codes are used in JSON-RPC error responses and allow clients
/// to programmatically handle specific error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Encoder parameters are unusable.
    /// Trigger: zero sample rate, zero channels, unsupported bit depth,
    /// or a payload that cannot be framed with the given format.
    InvalidFormat,

    /// Sample buffer has zero length.
    /// Trigger: the speech API returned an empty audio payload.
    EmptyInput,

    /// Input bytes could not be decoded.
    /// Trigger: bad base64 characters or padding, or a corrupt WAV header.
    MalformedInput,

    /// No live handle for the requested slot or URL.
    SlotNotFound,

    /// Filesystem failure while storing or releasing a blob.
    Io,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::EmptyInput => "EMPTY_INPUT",
            ErrorCode::MalformedInput => "MALFORMED_INPUT",
            ErrorCode::SlotNotFound => "SLOT_NOT_FOUND",
            ErrorCode::Io => "IO",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "Audio format parameters are invalid",
            ErrorCode::EmptyInput => "Audio payload is empty",
            ErrorCode::MalformedInput => "Input could not be decoded",
            ErrorCode::SlotNotFound => "No live handle for the requested slot",
            ErrorCode::Io => "Failed to store or release a blob",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => {
                "Use a sample rate > 0, at least one channel, 8/16/32 bits per sample, \
                 and a payload made of whole frames (speech output is 24000 Hz, mono, 16-bit)"
            }
            ErrorCode::EmptyInput => {
                "Nothing to play. Retry the generation request; the previous result is kept"
            }
            ErrorCode::MalformedInput => {
                "Send standard base64 (A-Z, a-z, 0-9, +, / with = padding) without line breaks"
            }
            ErrorCode::SlotNotFound => "Publish a result to the slot before addressing it",
            ErrorCode::Io => {
                "Check that the cache directory is writable (WAVSLOT_CACHE_PATH) \
                 or switch to the memory store with WAVSLOT_STORE=memory"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for wavslot operations.
#[derive(Debug)]
pub struct DaemonError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DaemonError {
    /// Creates a new DaemonError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new DaemonError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_FORMAT error.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Invalid audio format: {}", reason.into()),
        )
    }

    /// Creates an EMPTY_INPUT error.
    pub fn empty_input() -> Self {
        Self::new(ErrorCode::EmptyInput, "Sample buffer is empty")
    }

    /// Creates a MALFORMED_INPUT error.
    pub fn malformed_input(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MalformedInput,
            format!("Malformed input: {}", reason.into()),
        )
    }

    /// Creates a SLOT_NOT_FOUND error for a handle URL that is not live.
    pub fn url_not_found(url: &str) -> Self {
        Self::new(
            ErrorCode::SlotNotFound,
            format!("No live handle for URL: {}", url),
        )
    }

    /// Creates an IO error wrapping the underlying cause.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        let context = context.into();
        Self::with_source(ErrorCode::Io, format!("{}: {}", context, source), source)
    }
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using DaemonError.
pub type Result<T> = std::result::Result<T, DaemonError>;
