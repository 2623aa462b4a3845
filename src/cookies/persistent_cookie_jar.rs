use std::sync::{Arc, RwLock};

use anyhow::Result;

use crate::cookies::{CookieJar, CookieJarHandle, CookieOptions, CookieStoreHandle, DefaultCookieJar};

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// This type is *transparent* for reads but *eagerly* persists after writes.
/// A failed persist is returned to the caller; the in-memory state has
/// already changed by then.
pub struct PersistentCookieJar {
    /// Inner cookie jar that holds the actual cookie state.
    inner: DefaultCookieJar,
    /// Handle to the cookie store responsible for persistence.
    store_handle: CookieStoreHandle,
}

impl PersistentCookieJar {
    /// Loads the jar from `store` and binds it to that store for persistence.
    pub fn open(store_handle: CookieStoreHandle) -> Result<Self> {
        let inner = store_handle.load()?;
        Ok(Self { inner, store_handle })
    }

    /// Wraps the jar into a shareable handle.
    pub fn into_handle(self) -> CookieJarHandle {
        Arc::new(RwLock::new(self))
    }

    fn persist(&self) -> Result<()> {
        self.store_handle.persist(&self.inner)
    }
}

impl CookieJar for PersistentCookieJar {
    fn put(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        self.inner.put(name, value, options)?;
        self.persist()
    }

    fn get(&self, name: &str) -> Option<String> {
        self.inner.get(name)
    }

    fn remove(&mut self, name: &str, options: &CookieOptions) -> Result<()> {
        self.inner.remove(name, options)?;
        self.persist()
    }

    fn get_all(&self) -> Vec<(String, String)> {
        self.inner.get_all()
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        self.persist()
    }
}
