//! Result lifecycle module.
//!
//! Provides the revocable-reference registries and the slot manager that
//! is the only code allowed to create or revoke them.

pub mod disk;
pub mod manager;
pub mod registry;

// Re-export commonly used types
pub use disk::DiskRegistry;
pub use manager::{LifecycleStats, ResourceManager};
pub use registry::{MemoryRegistry, ObjectUrlRegistry};
