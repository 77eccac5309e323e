//! Disk-backed registry.
//!
//! Stores each published blob as a file in the cache directory and hands
//! out `file://` URLs a player or download sink can open directly.
//! Revoking a reference deletes its file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{DaemonError, Result};
use crate::types::Blob;

use super::registry::ObjectUrlRegistry;

/// URL scheme prefix for references issued by [`DiskRegistry`].
pub const FILE_URL_PREFIX: &str = "file://";

/// Registry writing blobs to files under a cache directory.
#[derive(Debug)]
pub struct DiskRegistry {
    /// Directory holding the stored blobs.
    dir: PathBuf,
    /// Live entries indexed by URL.
    entries: HashMap<String, DiskEntry>,
    /// Sequence number for the next file; never reused.
    next_id: u64,
}

#[derive(Debug)]
struct DiskEntry {
    path: PathBuf,
    blob: Blob,
}

impl DiskRegistry {
    /// Creates a registry storing files under `dir`.
    ///
    /// The directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    /// Returns the file path behind a live URL.
    pub fn path_of(&self, url: &str) -> Option<&Path> {
        self.entries.get(url).map(|e| e.path.as_path())
    }
}

impl ObjectUrlRegistry for DiskRegistry {
    fn create(&mut self, blob: &Blob) -> Result<String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            DaemonError::io(
                format!("Failed to create cache directory {}", self.dir.display()),
                e,
            )
        })?;

        let dir = std::path::absolute(&self.dir).map_err(|e| {
            DaemonError::io(
                format!("Failed to resolve cache directory {}", self.dir.display()),
                e,
            )
        })?;

        self.next_id += 1;
        let file_name = format!("{}-{}.{}", blob.digest(), self.next_id, blob.extension());
        let path = dir.join(file_name);
        let url = file_url(&path)?;

        if let Err(e) = std::fs::write(&path, blob.bytes()) {
            // Don't leave a truncated blob behind
            let _ = std::fs::remove_file(&path);
            return Err(DaemonError::io(
                format!("Failed to write blob {}", path.display()),
                e,
            ));
        }

        self.entries.insert(
            url.clone(),
            DiskEntry {
                path,
                blob: blob.clone(),
            },
        );
        Ok(url)
    }

    fn revoke(&mut self, url: &str) -> bool {
        let Some(entry) = self.entries.remove(url) else {
            return false;
        };

        // The reference is released even if the file is already gone.
        if let Err(e) = std::fs::remove_file(&entry.path) {
            tracing::warn!(path = %entry.path.display(), error = %e, "failed to delete revoked blob");
        }
        true
    }

    fn resolve(&self, url: &str) -> Option<Blob> {
        self.entries.get(url).map(|e| e.blob.clone())
    }

    fn live_count(&self) -> usize {
        self.entries.len()
    }
}

/// Builds a percent-encoded `file://` URL for an absolute path.
fn file_url(path: &Path) -> Result<String> {
    Url::from_file_path(path).map(String::from).map_err(|()| {
        DaemonError::io(
            "Failed to build file URL",
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not an absolute path", path.display()),
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::WAV_MIME_TYPE;
    use tempfile::tempdir;

    fn blob() -> Blob {
        Blob::new(vec![1u8, 2, 3, 4], WAV_MIME_TYPE, "speech.wav")
    }

    #[test]
    fn create_writes_file() {
        let dir = tempdir().unwrap();
        let mut registry = DiskRegistry::new(dir.path().join("blobs"));

        let url = registry.create(&blob()).unwrap();
        assert!(url.starts_with(FILE_URL_PREFIX));

        let path = registry.path_of(&url).unwrap().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "wav");
        assert_eq!(std::fs::read(&path).unwrap(), vec![1u8, 2, 3, 4]);
    }

    #[test]
    fn same_blob_gets_distinct_files() {
        let dir = tempdir().unwrap();
        let mut registry = DiskRegistry::new(dir.path());

        let a = registry.create(&blob()).unwrap();
        let b = registry.create(&blob()).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn revoke_deletes_file() {
        let dir = tempdir().unwrap();
        let mut registry = DiskRegistry::new(dir.path());

        let url = registry.create(&blob()).unwrap();
        let path = registry.path_of(&url).unwrap().to_path_buf();

        assert!(registry.revoke(&url));
        assert!(!path.exists());
        assert!(!registry.revoke(&url));
        assert!(registry.resolve(&url).is_none());
    }

    #[test]
    fn url_is_percent_encoded_and_round_trips() {
        let dir = tempdir().unwrap();
        let mut registry = DiskRegistry::new(dir.path().join("my blobs"));

        let url = registry.create(&blob()).unwrap();
        assert!(url.starts_with("file:///"));
        assert!(url.contains("my%20blobs"));

        let parsed = Url::parse(&url).unwrap();
        assert!(parsed.host().is_none());
        assert_eq!(parsed.to_file_path().unwrap(), registry.path_of(&url).unwrap());
    }

    #[test]
    fn relative_dir_yields_absolute_url() {
        let rel = PathBuf::from(format!("wavslot test blobs {}", std::process::id()));
        let mut registry = DiskRegistry::new(&rel);

        let url = registry.create(&blob()).unwrap();
        let path = registry.path_of(&url).unwrap().to_path_buf();
        assert!(path.is_absolute());
        assert_eq!(Url::parse(&url).unwrap().to_file_path().unwrap(), path);

        assert!(registry.revoke(&url));
        std::fs::remove_dir_all(&rel).unwrap();
    }

    #[test]
    fn failed_write_leaves_no_entry() {
        let dir = tempdir().unwrap();
        let mut registry = DiskRegistry::new(dir.path());
        let blob = blob();

        // Occupy the first file name with a directory so the write fails
        let target = dir.path().join(format!("{}-1.wav", blob.digest()));
        std::fs::create_dir(&target).unwrap();

        let err = registry.create(&blob).unwrap_err();
        assert_eq!(err.code, ErrorCode::Io);
        assert_eq!(registry.live_count(), 0);
        let files = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_file())
            .count();
        assert_eq!(files, 0);

        // The next sequence number is free
        let url = registry.create(&blob).unwrap();
        assert!(registry.path_of(&url).unwrap().is_file());
    }

    #[test]
    fn unwritable_directory_fails_with_io() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut registry = DiskRegistry::new(blocker.join("blobs"));
        let err = registry.create(&blob()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Io);
        assert_eq!(registry.live_count(), 0);
    }
}
