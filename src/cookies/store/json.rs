//! JSON-backed cookie store.
//!
//! `JsonCookieStore` persists a cookie jar as a single JSON file on disk.
//!
//! ### I/O characteristics & caveats
//! - `persist` rewrites the entire file. Cookie jars are small, so this is fine.
//! - A file that cannot be parsed is treated as empty (and logged); the next
//!   `persist` overwrites it.
//! - Cookies without expiry are persisted and reloaded like all others; there
//!   is no browser session to end them.
//!
//! ### Example
//! ```no_run
//! use std::sync::Arc;
//! use gosub_store::cookies::{JsonCookieStore, PersistentCookieJar};
//!
//! let store = Arc::new(JsonCookieStore::new("cookies.json"));
//! let jar = PersistentCookieJar::open(store).unwrap().into_handle();
//! ```
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cookies::store::CookieStore;
use crate::cookies::DefaultCookieJar;

/// A JSON-based cookie store that persists cookies across sessions.
#[derive(Debug, Clone)]
pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
}

impl JsonCookieStore {
    /// Creates a store at `path`. The file is created on the first `persist`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CookieStore for JsonCookieStore {
    fn load(&self) -> Result<DefaultCookieJar> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DefaultCookieJar::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read cookie store {}", self.path.display()))
            }
        };

        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Cookie store {} is corrupt, starting empty: {}", self.path.display(), e);
            DefaultCookieJar::new()
        }))
    }

    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<()> {
        let contents = serde_json::to_string_pretty(snapshot).context("cannot serialize cookies")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("cannot write cookie store {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{CookieJar, CookieOptions};

    #[test]
    fn missing_file_loads_empty_jar() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));

        assert_eq!(store.load().unwrap(), DefaultCookieJar::new());
        assert!(!store.path().exists());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));

        let mut jar = DefaultCookieJar::new();
        jar.put("token", "\"abc\"", &CookieOptions::default()).unwrap();
        store.persist(&jar).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.get("token").as_deref(), Some("\"abc\""));
        assert_eq!(loaded, jar);
    }

    #[test]
    fn corrupt_file_loads_empty_jar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonCookieStore::new(&path);
        assert!(store.load().unwrap().cookies.is_empty());
    }
}
