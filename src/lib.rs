//! Key/value persistence over heterogeneous storage backends.
//!
//! A [`StoreEngine`] stores JSON values under logical names. Each engine is
//! bound to one backend for persistent values and to the session backend for
//! session values, and shadows both with an in-memory cache.
//!
//! Backends come in three flavours:
//!
//! - **localStorage** ([`DurableBackend`]): durable storage of the host.
//! - **sessionStorage** ([`SessionBackend`]): session-scoped storage of the host.
//! - **cookieStorage** ([`CookieBackend`]): cookies; always available.
//!
//! The first two probe their native mechanism once when they are built and
//! permanently fall back to cookies when the probe fails.
//!
//! ```rust
//! use gosub_store::{BackendRegistry, Host, StoreConfig, StoreFactory};
//!
//! # fn main() -> Result<(), gosub_store::StoreError> {
//! let mut factory = StoreFactory::new(
//!     Host::in_memory(),
//!     BackendRegistry::with_defaults(),
//!     StoreConfig::default(),
//! )?;
//!
//! factory.store_mut().set("greeting", &"hello")?;
//! assert_eq!(factory.store_mut().get::<String>("greeting")?.as_deref(), Some("hello"));
//!
//! let mut profile = factory.create_namespaced_store("profile", Some("sessionStorage"), None)?;
//! profile.set("theme", &"dark")?;
//! # Ok(()) }
//! ```

pub mod backend;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod host;
pub mod namespace;
pub mod registry;
pub mod storage;
pub mod store;

pub use backend::{Backend, CookieBackend, DurableBackend, SessionBackend};
pub use config::{StoreConfig, StoreConfigError, WritePolicy};
pub use errors::StoreError;
pub use host::{Host, HostBuilder, StorageKind};
pub use namespace::Namespace;
pub use registry::{BackendContext, BackendRegistry, StoreFactory};
pub use store::{Scope, StoreEngine};
