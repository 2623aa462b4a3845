//! Backend registry and store factory.
//!
//! A [`BackendRegistry`] maps backend names to factory closures. The
//! [`StoreFactory`] runs every factory exactly once against a [`Host`], so
//! each native backend probes its storage once, and then hands out the
//! default [`StoreEngine`] and namespaced child engines bound to backends by
//! name.
//!
//! # Example: a namespaced store on session storage
//!
//! ```rust
//! use gosub_store::{BackendRegistry, Host, StoreConfig, StoreFactory};
//!
//! # fn main() -> Result<(), gosub_store::StoreError> {
//! let factory = StoreFactory::new(Host::in_memory(), BackendRegistry::with_defaults(), StoreConfig::default())?;
//!
//! let mut cart = factory.create_namespaced_store("cart", Some("sessionStorage"), Some(":"))?;
//! cart.set("items", &vec![1, 2, 3])?;
//! assert_eq!(cart.get_namespaced_key("items"), "cart:items");
//!
//! assert!(factory.create_namespaced_store("cart", Some("nope"), None).is_err());
//! # Ok(()) }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::backend::{
    Backend, CookieBackend, DurableBackend, SessionBackend, COOKIE_BACKEND, DURABLE_BACKEND, SESSION_BACKEND,
};
use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::host::Host;
use crate::namespace::Namespace;
use crate::store::StoreEngine;

/// What a backend factory gets to build its backend from.
pub struct BackendContext<'a> {
    pub host: &'a Host,
    /// The shared cookie backend, the fallback for native backends.
    pub cookies: &'a CookieBackend,
    pub config: &'a StoreConfig,
}

/// Builds a backend for a host.
pub type BackendFactory = Box<dyn Fn(&BackendContext<'_>) -> Result<Arc<dyn Backend>> + Send + Sync>;

/// Backend names and the factories that build them.
#[derive(Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `localStorage`, `sessionStorage` and `cookieStorage`.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(COOKIE_BACKEND, |ctx| Ok(Arc::new(ctx.cookies.clone()) as Arc<dyn Backend>))
            .register(DURABLE_BACKEND, |ctx| {
                Ok(Arc::new(DurableBackend::new(ctx.host, ctx.cookies.clone())) as Arc<dyn Backend>)
            })
            .register(SESSION_BACKEND, |ctx| {
                Ok(Arc::new(SessionBackend::new(ctx.host, ctx.cookies.clone())) as Arc<dyn Backend>)
            })
    }

    /// Registers `factory` under `name`, replacing any earlier registration.
    pub fn register<S, F>(mut self, name: S, factory: F) -> Self
    where
        S: Into<String>,
        F: Fn(&BackendContext<'_>) -> Result<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// Owns the backends of one host and creates store engines on top of them.
pub struct StoreFactory {
    host: Host,
    config: StoreConfig,
    backends: HashMap<String, Arc<dyn Backend>>,
    store: StoreEngine,
}

impl fmt::Debug for StoreFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreFactory")
            .field("host", &self.host)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl StoreFactory {
    /// Builds every registered backend and the default store.
    ///
    /// Fails with [`StoreError::UnknownBackend`] when the configured default
    /// backend or `sessionStorage` is not registered, and with
    /// [`StoreError::Backend`] when a backend factory fails.
    pub fn new(host: Host, registry: BackendRegistry, config: StoreConfig) -> Result<Self, StoreError> {
        let mut backends = HashMap::new();
        {
            let cookies = CookieBackend::new(host.cookie_jar(), config.cookie_options.clone());
            let ctx = BackendContext { host: &host, cookies: &cookies, config: &config };

            for (name, factory) in registry.factories {
                let backend = factory(&ctx)?;
                backends.insert(name, backend);
            }
        }

        let storage = lookup(&backends, &config.default_backend)?;
        let session = lookup(&backends, SESSION_BACKEND)?;
        let store = StoreEngine::new(
            Namespace::new(None::<&str>, Some(config.delimiter.as_str())),
            storage,
            session,
            config.write_policy,
        );

        Ok(Self { host, config, backends, store })
    }

    /// The default store: configured backend, no namespace.
    pub fn store(&self) -> &StoreEngine {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StoreEngine {
        &mut self.store
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the backend registered as `name`.
    pub fn backend(&self, name: &str) -> Result<Arc<dyn Backend>, StoreError> {
        lookup(&self.backends, name)
    }

    /// Creates a fresh engine with its own cache, bound to `backend_name`.
    ///
    /// A `None` backend name binds `localStorage`, whatever the default store
    /// is configured with. A `None` or empty delimiter uses the configured one.
    pub fn create_namespaced_store(
        &self,
        namespace: &str,
        backend_name: Option<&str>,
        delimiter: Option<&str>,
    ) -> Result<StoreEngine, StoreError> {
        let backend_name = backend_name.unwrap_or(DURABLE_BACKEND);
        let storage = lookup(&self.backends, backend_name)?;
        let session = lookup(&self.backends, SESSION_BACKEND)?;

        let delimiter = delimiter
            .filter(|d| !d.is_empty())
            .unwrap_or(self.config.delimiter.as_str());

        log::debug!("creating store '{namespace}' on {backend_name}");
        Ok(StoreEngine::new(
            Namespace::new(Some(namespace), Some(delimiter)),
            storage,
            session,
            self.config.write_policy,
        ))
    }
}

fn lookup(backends: &HashMap<String, Arc<dyn Backend>>, name: &str) -> Result<Arc<dyn Backend>, StoreError> {
    backends
        .get(name)
        .cloned()
        .ok_or_else(|| StoreError::UnknownBackend(name.to_string()))
}
