//! Core types and shared functionality for overcast.
//!
//! This crate provides:
//! - Versioned cache generations with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CachedResponse, Generation, GenerationManager, GenerationStore, MemoryStore, SqliteStore};
pub use config::AppConfig;
pub use error::Error;
