//! # arbor-service
//!
//! The engine layer of Arbor: the listing mode selector and the
//! storage-backed hierarchy manager that keeps node records and storage
//! objects synchronized across structural mutations.
//!
//! Services follow constructor injection; collaborators are provided at
//! construction time as `Arc` references, so a service clone is cheap
//! and shares state with its original.

pub mod library;
pub mod listing;

pub use library::{BatchReport, LibraryService, UploadedFile};
pub use listing::{ListMode, ListOptions, ListRequest, Listing, ProjectedNode};
