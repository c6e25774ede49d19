//! Unified error types for lifeboat.
//!
//! The taxonomy follows the engine's propagation rules: storage failures,
//! transport-level network failures, and invalid URLs. Non-success HTTP
//! statuses are not errors; they travel as ordinary responses so the
//! resolution policy can decide what to do with them.

use tokio_rusqlite::rusqlite;

/// Unified error types for the lifeboat engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store open/read/write failure.
    #[error("STORAGE_ERROR: {0}")]
    Storage(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored response metadata could not be encoded or decoded.
    #[error("STORAGE_ERROR: encoding: {0}")]
    Encoding(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch failed at the transport level (unreachable host, reset
    /// connection, unreadable body). Distinct from an error-status response.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Storage(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Storage(tokio_rusqlite::Error::Close(c)),
            _ => Error::Storage(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Storage(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(tokio_rusqlite::Error::Error(err))
    }
}
