//! Storage backends.
//!
//! A [`Backend`] is the narrow key/value capability the store engine writes
//! through: `set`, `get` and `remove` of raw strings. Three backends exist:
//!
//! - [`CookieBackend`]: writes cookies; always available and the universal
//!   fallback.
//! - [`DurableBackend`]: the host's durable storage (`localStorage`).
//! - [`SessionBackend`]: the host's session storage (`sessionStorage`).
//!
//! The durable and session backends [`probe`] their native storage once when
//! they are built. When the probe fails they delegate every operation to the
//! cookie backend for the rest of their life.

mod cookie;
mod native;
mod probe;

use anyhow::Result;

pub use cookie::CookieBackend;
pub use native::{DurableBackend, SessionBackend};
pub use probe::{probe, PROBE_KEY, PROBE_VALUE};

/// Registry name of the durable backend.
pub const DURABLE_BACKEND: &str = "localStorage";
/// Registry name of the session backend.
pub const SESSION_BACKEND: &str = "sessionStorage";
/// Registry name of the cookie backend.
pub const COOKIE_BACKEND: &str = "cookieStorage";

/// Key/value capability over a concrete storage mechanism.
pub trait Backend: Send + Sync {
    /// Name the backend is registered under.
    fn name(&self) -> &str;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns the value stored under `key`. A missing key is `None`, never an error.
    fn get(&self, key: &str) -> Option<String>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}
