//! The storage-backed hierarchy manager and its helpers.

pub mod naming;
pub mod pathsync;
pub mod report;
pub mod service;

pub use report::BatchReport;
pub use service::{LibraryService, UploadedFile};
