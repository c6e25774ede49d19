//! Generation and entry operations.
//!
//! Provides the versioned-store contract: idempotent generation open,
//! per-key get/put with last-write-wins overwrite, tag enumeration, and
//! irreversible generation deletion.

use super::connection::VersionedStore;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An immutable snapshot of a prior network response.
///
/// Owned by the generation that holds it; never shared across generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    /// Ordered (name, value) pairs as received.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredResponse {
    /// Snapshot a response body and headers, stamping the storage time.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// First header value matching `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl VersionedStore {
    /// Idempotently create the generation for `tag` if it doesn't exist.
    ///
    /// A failure here is a storage failure and is fatal to installation.
    pub async fn open_generation(&self, tag: &str) -> Result<(), Error> {
        let tag = tag.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (tag, created_at) VALUES (?1, ?2)",
                    params![tag, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a stored response by key within a generation.
    ///
    /// Returns None on a cache miss.
    pub async fn get(&self, tag: &str, key: &str) -> Result<Option<StoredResponse>, Error> {
        let tag = tag.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, stored_at
                     FROM entries WHERE tag = ?1 AND key = ?2",
                    params![tag, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                );

                match result {
                    Ok((status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::Encoding(e.to_string()))?;
                        Ok(Some(StoredResponse { status, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Persist a response under `(tag, key)`.
    ///
    /// UPSERT semantics: last write wins. Each put is independently atomic;
    /// concurrent puts to different keys never interfere. Opens the
    /// generation if absent, matching the engine's open-then-put call sites.
    pub async fn put(&self, tag: &str, key: &str, response: &StoredResponse) -> Result<(), Error> {
        let tag = tag.to_string();
        let key = key.to_string();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let headers_json =
                    serde_json::to_string(&response.headers).map_err(|e| Error::Encoding(e.to_string()))?;
                conn.execute(
                    "INSERT OR IGNORE INTO generations (tag, created_at) VALUES (?1, ?2)",
                    params![tag, chrono::Utc::now().to_rfc3339()],
                )?;
                conn.execute(
                    "INSERT INTO entries (tag, key, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(tag, key) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![tag, key, response.status, headers_json, response.body, response.stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All known generation tags, oldest first.
    pub async fn list_tags(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT tag FROM generations ORDER BY created_at, tag")?;
                let tags = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tags)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and every entry it owns.
    ///
    /// Irreversible; no-op if the tag doesn't exist.
    pub async fn delete_generation(&self, tag: &str) -> Result<(), Error> {
        tracing::debug!(tag, "deleting generation");
        let tag = tag.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM generations WHERE tag = ?1", params![tag])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored under a generation.
    pub async fn entry_count(&self, tag: &str) -> Result<u64, Error> {
        let tag = tag.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE tag = ?1", params![tag], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
