//! Versioned cache generations over an injectable blob store.
//!
//! This module provides the storage side of the cache proxy:
//!
//! - A `GenerationStore` trait over get/put/delete/list, so tests can
//!   substitute an in-memory fake for the SQLite backend
//! - Content-addressed request signatures using SHA-256 hashing
//! - Automatic schema migrations and WAL mode for the SQLite backend
//! - Named generations, created idempotently and deleted atomically

pub mod connection;
pub mod entries;
pub mod entry;
pub mod generations;
pub mod migrations;
pub mod signature;
pub mod store;

pub use crate::Error;

pub use connection::SqliteStore;
pub use entry::CachedResponse;
pub use generations::{Generation, GenerationManager};
pub use store::{GenerationStore, MemoryStore};
