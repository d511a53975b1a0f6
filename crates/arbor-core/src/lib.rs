//! # arbor-core
//!
//! Core crate for Arbor. Contains traits, configuration schemas, typed
//! identifiers, pagination/sorting/projection types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Arbor crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
