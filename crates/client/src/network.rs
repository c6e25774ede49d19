//! Network access behind a trait seam.
//!
//! The resolution policy and precache loader talk to `Network`, never to
//! reqwest directly, so tests can substitute a scripted fake. The real
//! implementation classifies every response as same-origin ("basic") or
//! opaque; opaque responses are never cached.
//!
//! No request timeout is configured: a stalled fetch stalls that request's
//! task. The engine also never cancels an in-flight fetch.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use url::Url;

use lifeboat_core::{Error, StoredResponse};

use crate::request::canonicalize;

/// How a fetch interacts with intermediary HTTP caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Ordinary fetch.
    Default,
    /// Cache-bypassing fetch (`Cache-Control: no-cache`), used when
    /// precaching so a fresh install never snapshots stale intermediaries.
    Reload,
}

/// Whether a response's content may be inspected and reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    /// Same-origin response; safe to cache.
    Basic,
    /// Cross-origin or redirected-off-origin response; never cached.
    Opaque,
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct NetworkResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as ordered (name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Bytes,
    /// Same-origin or opaque.
    pub origin: ResponseOrigin,
}

impl NetworkResponse {
    /// Whether the resolution policy may store this response: a 200
    /// same-origin response and nothing else.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.origin == ResponseOrigin::Basic
    }

    /// Snapshot this response for the store.
    pub fn to_stored(&self) -> StoredResponse {
        StoredResponse::new(self.status, self.headers.clone(), self.body.to_vec())
    }
}

/// Seam between the decision engine and the wire.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a URL, resolving with the response for any HTTP status.
    ///
    /// Errs only on transport failure (`Error::Network`).
    async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<NetworkResponse, Error>;
}

/// reqwest-backed network client.
pub struct HttpNetwork {
    http: Client,
    origin: Url,
}

impl HttpNetwork {
    /// Build a client serving the given application origin.
    ///
    /// Deliberately sets no timeout; see the module docs.
    pub fn new(origin: &str, user_agent: &str) -> Result<Self, Error> {
        let origin = canonicalize(origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, origin })
    }

    /// The application origin this client judges responses against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<NetworkResponse, Error> {
        let mut request = self.http.get(url.as_str());
        if mode == FetchMode::Reload {
            request = request.header(header::CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("fetch failed: {e}")))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = header_pairs(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

        // A redirect off the app origin (or a request that never was on it)
        // yields an opaque response.
        let origin = if final_url.origin() == self.origin.origin() {
            ResponseOrigin::Basic
        } else {
            ResponseOrigin::Opaque
        };

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            status,
            opaque = (origin == ResponseOrigin::Opaque),
            bytes = body.len(),
            "fetched"
        );

        Ok(NetworkResponse { status, headers, body, origin })
    }
}

fn header_pairs(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
