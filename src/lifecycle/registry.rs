//! Object-URL registry seam.
//!
//! The registry is the process-wide table of revocable references. Only the
//! [`ResourceManager`](super::ResourceManager) creates or revokes entries
//! for published results.

use std::collections::HashMap;

use crate::error::Result;
use crate::types::Blob;

/// URL prefix for references issued by [`MemoryRegistry`].
pub const MEMORY_URL_PREFIX: &str = "blob:wavslot/";

/// A table of revocable references to blobs.
pub trait ObjectUrlRegistry {
    /// Registers `blob` and returns a new, unique URL addressing it.
    fn create(&mut self, blob: &Blob) -> Result<String>;

    /// Releases the reference. Returns `false` if the URL was unknown or
    /// already revoked.
    fn revoke(&mut self, url: &str) -> bool;

    /// Returns the blob behind a live URL.
    fn resolve(&self, url: &str) -> Option<Blob>;

    /// Number of live references.
    fn live_count(&self) -> usize;
}

impl<R: ObjectUrlRegistry + ?Sized> ObjectUrlRegistry for Box<R> {
    fn create(&mut self, blob: &Blob) -> Result<String> {
        (**self).create(blob)
    }

    fn revoke(&mut self, url: &str) -> bool {
        (**self).revoke(url)
    }

    fn resolve(&self, url: &str) -> Option<Blob> {
        (**self).resolve(url)
    }

    fn live_count(&self) -> usize {
        (**self).live_count()
    }
}

/// In-process registry holding blobs in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    /// Live blobs indexed by URL.
    entries: HashMap<String, Blob>,
    /// Sequence number for the next URL; never reused.
    next_id: u64,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectUrlRegistry for MemoryRegistry {
    fn create(&mut self, blob: &Blob) -> Result<String> {
        self.next_id += 1;
        let url = format!("{}{:016x}", MEMORY_URL_PREFIX, self.next_id);
        self.entries.insert(url.clone(), blob.clone());
        Ok(url)
    }

    fn revoke(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    fn resolve(&self, url: &str) -> Option<Blob> {
        self.entries.get(url).cloned()
    }

    fn live_count(&self) -> usize {
        self.entries.len()
    }
}
