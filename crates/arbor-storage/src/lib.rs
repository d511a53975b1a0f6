//! # arbor-storage
//!
//! Storage backend implementations for Arbor. Supports the local
//! filesystem and an in-process object store, routed through a disk
//! registry, with URL resolution for stored objects.

pub mod backends;
pub mod registry;
pub mod url;

pub use backends::{LocalBackend, MemoryBackend};
pub use registry::DiskRegistry;
pub use url::UrlResolver;
