//! Intercepted-request model, classification, and key derivation.
//!
//! Every intercepted request carries its URL and the declared
//! content-destination. Classification is a pure function into a small
//! enum so the resolution policy never branches on raw strings.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Category of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Navigation request for a document.
    Document,
    /// Image asset.
    Image,
    /// Any other static asset (scripts, styles, fonts, data).
    Other,
}

/// Classify a declared content-destination.
///
/// Unclassifiable destinations default to `Other`; there is no failure mode.
pub fn classify(destination: &str) -> RequestClass {
    match destination {
        "document" => RequestClass::Document,
        "image" => RequestClass::Image,
        _ => RequestClass::Other,
    }
}

/// One intercepted outgoing request.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub url: Url,
    /// Declared content-destination ("document", "image", "script", ...).
    pub destination: String,
}

impl InterceptedRequest {
    pub fn new(url: Url, destination: impl Into<String>) -> Self {
        Self { url, destination: destination.into() }
    }

    /// Build a request from a raw URL string, canonicalizing it.
    pub fn parse(url: &str, destination: impl Into<String>) -> Result<Self, UrlError> {
        Ok(Self::new(canonicalize(url)?, destination))
    }

    pub fn class(&self) -> RequestClass {
        classify(&self.destination)
    }

    /// The store key this request resolves against.
    pub fn key(&self) -> String {
        request_key(&self.url)
    }
}

/// Derive the store key for a URL: the normalized path plus query.
///
/// The origin is dropped on purpose; one application, one origin, and keys
/// stay readable in the store.
pub fn request_key(url: &Url) -> String {
    let path = url.path();
    let path = if path.is_empty() { "/" } else { path };
    match url.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    }
}

/// Canonicalize a URL string for consistent keying.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(mut host) = parsed.host_str() {
        let h = host.to_lowercase();
        host = h.as_str();
        parsed
            .set_host(Some(host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
