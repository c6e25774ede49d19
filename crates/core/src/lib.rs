//! Core types and shared functionality for lifeboat.
//!
//! This crate provides:
//! - Versioned response store with SQLite backend
//! - Precache manifest parsing
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod manifest;
pub mod store;

pub use error::Error;
pub use manifest::{Manifest, SHELL_KEY};
pub use store::{StoredResponse, VersionedStore};
