//! Concrete node store implementations.

pub mod memory;
pub mod postgres;
