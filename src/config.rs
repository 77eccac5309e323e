//! Daemon configuration module.
//!
//! Contains the runtime configuration for wavslot, including the blob
//! store selection, the cache path and the default PCM format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::lifecycle::{DiskRegistry, MemoryRegistry, ObjectUrlRegistry};
use crate::types::AudioFormat;

/// Where published blobs live while their handles are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Keep blobs in process memory; URLs are `blob:` references.
    #[default]
    Memory,

    /// Write blobs into the cache directory; URLs are `file://` paths
    /// that external players can open.
    Disk,
}

impl StoreKind {
    /// Returns the string representation of the store kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Disk => "disk",
        }
    }

    /// Parses a store kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Some(StoreKind::Memory),
            "disk" | "file" => Some(StoreKind::Disk),
            _ => None,
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime configuration for the daemon.
///
/// This configuration is typically loaded from environment variables at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory for stored blobs when using the disk store.
    /// If None, uses the platform-specific default cache location.
    pub cache_path: Option<PathBuf>,

    /// Blob store backing the object-URL registry.
    pub store: StoreKind,

    /// PCM format assumed when a request does not specify one.
    pub default_format: AudioFormat,
}

impl DaemonConfig {
    /// Creates a new DaemonConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a DaemonConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `WAVSLOT_CACHE_PATH` - Directory for the disk store
    /// - `WAVSLOT_STORE` - Blob store (memory, disk)
    /// - `WAVSLOT_SAMPLE_RATE` - Default sample rate in Hz
    /// - `WAVSLOT_CHANNELS` - Default channel count
    /// - `WAVSLOT_BITS_PER_SAMPLE` - Default bit depth (8, 16, 32)
    ///
    /// Falls back to defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("WAVSLOT_CACHE_PATH") {
            config.cache_path = Some(PathBuf::from(path));
        }

        if let Ok(store_str) = std::env::var("WAVSLOT_STORE") {
            if let Some(store) = StoreKind::parse(&store_str) {
                config.store = store;
            }
        }

        if let Ok(rate_str) = std::env::var("WAVSLOT_SAMPLE_RATE") {
            if let Ok(rate) = rate_str.parse::<u32>() {
                if rate > 0 {
                    config.default_format.sample_rate = rate;
                }
            }
        }

        if let Ok(channels_str) = std::env::var("WAVSLOT_CHANNELS") {
            if let Ok(channels) = channels_str.parse::<u16>() {
                if channels > 0 {
                    config.default_format.channels = channels;
                }
            }
        }

        if let Ok(bits_str) = std::env::var("WAVSLOT_BITS_PER_SAMPLE") {
            if let Ok(bits) = bits_str.parse::<u16>() {
                config.default_format.bits_per_sample = bits;
            }
        }

        config
    }

    /// Returns the effective cache path, using platform defaults if not specified.
    pub fn effective_cache_path(&self) -> PathBuf {
        if let Some(ref path) = self.cache_path {
            path.clone()
        } else {
            default_cache_path()
        }
    }

    /// Builds the registry selected by `store`.
    pub fn build_registry(&self) -> Box<dyn ObjectUrlRegistry> {
        match self.store {
            StoreKind::Memory => Box::new(MemoryRegistry::new()),
            StoreKind::Disk => Box::new(DiskRegistry::new(self.effective_cache_path())),
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if let Err(e) = self.default_format.validate() {
            return Some(format!("default format: {}", e.message));
        }

        if let Some(ref path) = self.cache_path {
            if path.as_os_str().is_empty() {
                return Some("cache_path must not be empty".to_string());
            }
        }

        None
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            store: StoreKind::default(),
            default_format: AudioFormat::SPEECH,
        }
    }
}

/// Returns the platform-specific default blob storage path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/wavslot/blobs
/// - Linux: ~/.cache/wavslot/blobs
/// - Windows: C:\Users\<user>\AppData\Local\wavslot\cache\blobs
fn default_cache_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "wavslot") {
        proj_dirs.cache_dir().join("blobs")
    } else {
        // Fallback to current directory
        PathBuf::from("./wavslot-blobs")
    }
}
