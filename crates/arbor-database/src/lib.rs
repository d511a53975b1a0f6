//! # arbor-database
//!
//! Node record stores for Arbor: a PostgreSQL implementation plus an
//! in-process memory implementation behind one trait, together with
//! connection pool management and the migration runner.

pub mod connection;
pub mod migration;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use store::{NodeQuery, NodeStore, ParentFilter};
pub use stores::memory::MemoryNodeStore;
pub use stores::postgres::PgNodeStore;
