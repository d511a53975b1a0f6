//! Storage backend implementations.

pub mod local;
pub mod memory;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
