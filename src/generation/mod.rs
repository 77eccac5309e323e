//! Generation result module.
//!
//! Provides the pipeline turning synthesis payloads into published slot
//! results.

pub mod pipeline;

// Re-export commonly used items
pub use pipeline::{default_file_name, publish_speech, publish_speech_if_current, speech_blob};
