//! Cookie store infrastructure.
//!
//! A **cookie store** is the persistence layer behind a
//! [`PersistentCookieJar`](crate::cookies::PersistentCookieJar). The jar loads
//! its initial state from the store and pushes a snapshot back after every
//! mutation, so cookies written by the cookie backend survive restarts of a
//! native host.
//!
//! This module exports one reference implementation:
//! - [`JsonCookieStore`]: file-backed JSON store.
mod json;

use anyhow::Result;

use crate::cookies::DefaultCookieJar;

/// File-backed JSON cookie store.
pub use json::JsonCookieStore;

/// A cookie **store** loads and persists the state of a cookie jar.
///
/// Implementations must be `Send + Sync` and safe for concurrent use.
pub trait CookieStore: Send + Sync {
    /// Loads the persisted jar. A store without persisted state returns an empty jar.
    fn load(&self) -> Result<DefaultCookieJar>;

    /// Replaces the persisted state with `snapshot`.
    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<()>;
}
