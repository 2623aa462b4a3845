//! The host environment a store runs in.
//!
//! A [`Host`] bundles the native mechanisms the backends are built on: an
//! optional durable storage area (`localStorage`), an optional session storage
//! area (`sessionStorage`) and the cookie jar. It is the Rust stand-in for the
//! browser `window`: a host without a durable area behaves like a browser
//! without `localStorage`, and a host whose area refuses writes behaves like
//! a browser in a locked-down private mode.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gosub_store::{Host, StorageKind};
//! use gosub_store::storage::DisabledArea;
//!
//! let host = Host::builder()
//!     .durable(Arc::new(DisabledArea))
//!     .without_session()
//!     .build();
//!
//! assert!(!host.is_available(StorageKind::Durable));
//! assert!(!host.is_available(StorageKind::Session));
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::backend::probe;
use crate::cookies::{CookieJarHandle, DefaultCookieJar};
use crate::storage::{MemoryArea, StorageArea};

/// The two native storage mechanisms a host may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Survives restarts (`localStorage`).
    Durable,
    /// Lives as long as the session (`sessionStorage`).
    Session,
}

impl StorageKind {
    fn index(self) -> usize {
        match self {
            StorageKind::Durable => 0,
            StorageKind::Session => 1,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Durable => write!(f, "localStorage"),
            StorageKind::Session => write!(f, "sessionStorage"),
        }
    }
}

pub struct Host {
    durable: Option<Arc<dyn StorageArea>>,
    session: Option<Arc<dyn StorageArea>>,
    cookie_jar: CookieJarHandle,
    /// Memoized probe results, indexed by [`StorageKind`].
    probes: [OnceLock<bool>; 2],
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("durable", &self.durable.is_some())
            .field("session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    /// Host with in-memory durable and session storage and an in-memory cookie jar.
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    /// Host with SQLite-backed durable storage, in-memory session storage and
    /// cookies persisted to a JSON file.
    #[cfg(feature = "sqlite")]
    pub fn persistent<P, C>(database: P, cookie_file: C) -> anyhow::Result<Self>
    where
        P: AsRef<std::path::Path>,
        C: Into<std::path::PathBuf>,
    {
        use crate::cookies::{JsonCookieStore, PersistentCookieJar};
        use crate::storage::SqliteStorage;

        let storage = SqliteStorage::open(database)?;
        let cookie_jar = PersistentCookieJar::open(Arc::new(JsonCookieStore::new(cookie_file)))?;

        Ok(Self::builder()
            .durable(storage.area("local"))
            .cookie_jar(cookie_jar.into_handle())
            .build())
    }

    /// Host bound to the current browser window: `window.localStorage`,
    /// `window.sessionStorage` and `document.cookie`.
    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub fn browser() -> Self {
        use crate::cookies::DocumentCookieJar;
        use crate::storage::WebStorageArea;
        use std::sync::RwLock;

        let area = |kind| {
            WebStorageArea::new(kind).map(|a| Arc::new(a) as Arc<dyn StorageArea>)
        };

        Self {
            durable: area(StorageKind::Durable),
            session: area(StorageKind::Session),
            cookie_jar: Arc::new(RwLock::new(DocumentCookieJar::new())),
            probes: Default::default(),
        }
    }

    /// Returns the raw storage area for `kind`, without probing it.
    pub fn storage(&self, kind: StorageKind) -> Option<Arc<dyn StorageArea>> {
        match kind {
            StorageKind::Durable => self.durable.clone(),
            StorageKind::Session => self.session.clone(),
        }
    }

    pub fn cookie_jar(&self) -> CookieJarHandle {
        self.cookie_jar.clone()
    }

    /// Probes the storage for `kind`. The probe runs once per host; later
    /// calls return the memoized result.
    pub fn is_available(&self, kind: StorageKind) -> bool {
        *self.probes[kind.index()].get_or_init(|| {
            let available = self
                .storage(kind)
                .is_some_and(|area| probe(area.as_ref()));
            log::debug!("{kind} probe: available={available}");
            available
        })
    }

    /// Returns the storage area for `kind` when its probe succeeded.
    pub fn native_area(&self, kind: StorageKind) -> Option<Arc<dyn StorageArea>> {
        if self.is_available(kind) {
            self.storage(kind)
        } else {
            None
        }
    }
}

/// Builder for [`Host`]. Starts with in-memory storage areas and an
/// in-memory cookie jar.
pub struct HostBuilder {
    durable: Option<Arc<dyn StorageArea>>,
    session: Option<Arc<dyn StorageArea>>,
    cookie_jar: Option<CookieJarHandle>,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self {
            durable: Some(Arc::new(MemoryArea::new())),
            session: Some(Arc::new(MemoryArea::new())),
            cookie_jar: None,
        }
    }
}

impl HostBuilder {
    pub fn durable(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.durable = Some(area);
        self
    }

    pub fn session(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.session = Some(area);
        self
    }

    /// The host has no durable storage API at all.
    pub fn without_durable(mut self) -> Self {
        self.durable = None;
        self
    }

    /// The host has no session storage API at all.
    pub fn without_session(mut self) -> Self {
        self.session = None;
        self
    }

    pub fn cookie_jar(mut self, jar: CookieJarHandle) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn build(self) -> Host {
        Host {
            durable: self.durable,
            session: self.session,
            cookie_jar: self
                .cookie_jar
                .unwrap_or_else(|| DefaultCookieJar::new().into_handle()),
            probes: Default::default(),
        }
    }
}
