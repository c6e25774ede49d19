//! SQLite-backed versioned store for cached responses.
//!
//! This module provides a persistent store of named generations using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named, versioned generations created and deleted wholesale
//! - Per-key atomic writes with last-write-wins overwrite semantics
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod migrations;

pub use crate::Error;

pub use connection::VersionedStore;
pub use entries::StoredResponse;
