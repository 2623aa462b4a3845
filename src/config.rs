//! Store configuration.
//!
//! `StoreConfig` is what a composition root hands to
//! [`StoreFactory`](crate::registry::StoreFactory): which backend the default
//! store uses, the namespace delimiter, how writes are ordered against the
//! in-memory cache and the cookie attributes used by the cookie backend.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_store::StoreConfig;
//! let cfg = StoreConfig::default();
//! assert_eq!(cfg.default_backend, "localStorage");
//! assert_eq!(cfg.delimiter, ".");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_store::{StoreConfig, WritePolicy};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = StoreConfig::builder()
//!     .default_backend("sessionStorage")
//!     .delimiter(":")
//!     .write_policy(WritePolicy::WriteThenCache)
//!     .build()?;
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`StoreConfigError`] when the backend name or
//! the delimiter is empty.

use std::fmt;

use crate::backend::DURABLE_BACKEND;
use crate::cookies::CookieOptions;
use crate::namespace::DEFAULT_DELIMITER;

/// Ordering between the in-memory cache update and the backend write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Update the cache first, then write to the backend. When the backend
    /// write fails the cache has already advanced, so later reads in the same
    /// process observe the new value.
    #[default]
    CacheThenWrite,
    /// Write to the backend first and only update the cache when it succeeded.
    WriteThenCache,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend name the default store is bound to.
    pub default_backend: String,
    /// Delimiter placed between a namespace and a logical name.
    pub delimiter: String,
    pub write_policy: WritePolicy,
    /// Attributes applied to every cookie written by the cookie backend.
    pub cookie_options: CookieOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_backend: DURABLE_BACKEND.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            write_policy: WritePolicy::default(),
            cookie_options: CookieOptions::default(),
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    inner: StoreConfig,
}

impl StoreConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut StoreConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn default_backend<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.default_backend = name.into()) }
    pub fn delimiter<S: Into<String>>(self, delimiter: S) -> Self { self.map(|c| c.delimiter = delimiter.into()) }
    pub fn write_policy(self, policy: WritePolicy) -> Self { self.map(|c| c.write_policy = policy) }
    pub fn cookie_options(self, options: CookieOptions) -> Self { self.map(|c| c.cookie_options = options) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut StoreConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<StoreConfig, StoreConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfigError {
    EmptyBackendName,
    EmptyDelimiter,
}

impl fmt::Display for StoreConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfigError::EmptyBackendName =>
                write!(f, "default_backend must not be empty"),
            StoreConfigError::EmptyDelimiter =>
                write!(f, "delimiter must not be empty"),
        }
    }
}
impl std::error::Error for StoreConfigError {}

fn validate(c: &StoreConfig) -> Result<(), StoreConfigError> {
    if c.default_backend.trim().is_empty() {
        return Err(StoreConfigError::EmptyBackendName);
    }
    if c.delimiter.is_empty() {
        return Err(StoreConfigError::EmptyDelimiter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_local_storage_with_dot_delimiter() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.default_backend, "localStorage");
        assert_eq!(cfg.delimiter, ".");
        assert_eq!(cfg.write_policy, WritePolicy::CacheThenWrite);
        assert_eq!(cfg.cookie_options.path.as_deref(), Some("/"));
    }

    #[test]
    fn builder_applies_changes() {
        let cfg = StoreConfig::builder()
            .default_backend("cookieStorage")
            .delimiter("::")
            .write_policy(WritePolicy::WriteThenCache)
            .build()
            .unwrap();

        assert_eq!(cfg.default_backend, "cookieStorage");
        assert_eq!(cfg.delimiter, "::");
        assert_eq!(cfg.write_policy, WritePolicy::WriteThenCache);
    }

    #[test]
    fn builder_rejects_empty_values() {
        let err = StoreConfig::builder().default_backend("  ").build().unwrap_err();
        assert_eq!(err, StoreConfigError::EmptyBackendName);

        let err = StoreConfig::builder().delimiter("").build().unwrap_err();
        assert_eq!(err, StoreConfigError::EmptyDelimiter);
        assert_eq!(err.to_string(), "delimiter must not be empty");
    }
}
