//! Core traits defined in `arbor-core` and implemented by other crates.

pub mod backend;

pub use backend::StorageBackend;
