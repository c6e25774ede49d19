//! Precache manifest: the fixed, ordered asset list loaded at install time.
//!
//! The manifest is defined once at build/deploy time and read-only at
//! runtime. Entries are relative paths with no wildcard expansion; they are
//! normalized to a leading-slash form so they double as request keys.

use std::path::Path;

/// Canonical app-shell key: the single document served for all navigation
/// requests.
pub const SHELL_KEY: &str = "/";

/// Fixed ordered sequence of request keys to eagerly populate at install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    paths: Vec<String>,
}

impl Manifest {
    /// The application's built-in asset set.
    pub fn app_defaults() -> Self {
        Self {
            paths: ["/", "/index.html", "/manifest.json", "/logo.png", "/icon-192.png", "/icon-512.png"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Parse a manifest listing: one relative path per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. No glob
    /// expansion. Order is preserved.
    pub fn parse(text: &str) -> Self {
        let paths = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize)
            .collect();
        Self { paths }
    }

    /// Read and parse a manifest file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Entries in install order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Normalize a manifest path to its request-key form.
///
/// `./` and bare relative paths become absolute: `./index.html` and
/// `index.html` both normalize to `/index.html`; `./` and `.` to `/`.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let rest = trimmed.strip_prefix("./").unwrap_or(trimmed);
    match rest {
        "" | "." => SHELL_KEY.to_string(),
        p if p.starts_with('/') => p.to_string(),
        p => format!("/{p}"),
    }
}
