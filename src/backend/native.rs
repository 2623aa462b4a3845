use std::sync::Arc;

use anyhow::Result;

use crate::backend::{Backend, CookieBackend, DURABLE_BACKEND, SESSION_BACKEND};
use crate::host::{Host, StorageKind};
use crate::storage::StorageArea;

/// Where the operations of a native backend go. Fixed at construction.
enum Binding {
    Native(Arc<dyn StorageArea>),
    Delegated(CookieBackend),
}

struct NativeBackend {
    kind: StorageKind,
    binding: Binding,
}

impl NativeBackend {
    fn new(kind: StorageKind, host: &Host, cookies: CookieBackend) -> Self {
        let binding = match host.native_area(kind) {
            Some(area) => Binding::Native(area),
            None => {
                log::info!("{kind} is not available, delegating to cookies");
                Binding::Delegated(cookies)
            }
        };

        Self { kind, binding }
    }

    fn name(&self) -> &str {
        match self.kind {
            StorageKind::Durable => DURABLE_BACKEND,
            StorageKind::Session => SESSION_BACKEND,
        }
    }

    fn is_delegated(&self) -> bool {
        matches!(self.binding, Binding::Delegated(_))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match &self.binding {
            Binding::Native(area) => area.set_item(key, value),
            Binding::Delegated(cookies) => cookies.set(key, value),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match &self.binding {
            Binding::Native(area) => area.get_item(key),
            Binding::Delegated(cookies) => cookies.get(key),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match &self.binding {
            Binding::Native(area) => area.remove_item(key),
            Binding::Delegated(cookies) => cookies.remove(key),
        }
    }
}

/// Backend over the host's durable storage (`localStorage`).
pub struct DurableBackend(NativeBackend);

impl DurableBackend {
    /// Probes the host's durable storage and binds to it, or to `cookies`
    /// when the probe fails. The decision is permanent.
    pub fn new(host: &Host, cookies: CookieBackend) -> Self {
        Self(NativeBackend::new(StorageKind::Durable, host, cookies))
    }

    /// Returns `true` when operations go to the cookie backend.
    pub fn is_delegated(&self) -> bool {
        self.0.is_delegated()
    }
}

impl Backend for DurableBackend {
    fn name(&self) -> &str { self.0.name() }
    fn set(&self, key: &str, value: &str) -> Result<()> { self.0.set(key, value) }
    fn get(&self, key: &str) -> Option<String> { self.0.get(key) }
    fn remove(&self, key: &str) -> Result<()> { self.0.remove(key) }
}

/// Backend over the host's session storage (`sessionStorage`).
pub struct SessionBackend(NativeBackend);

impl SessionBackend {
    /// Like [`DurableBackend::new`], for session storage.
    pub fn new(host: &Host, cookies: CookieBackend) -> Self {
        Self(NativeBackend::new(StorageKind::Session, host, cookies))
    }

    pub fn is_delegated(&self) -> bool {
        self.0.is_delegated()
    }
}

impl Backend for SessionBackend {
    fn name(&self) -> &str { self.0.name() }
    fn set(&self, key: &str, value: &str) -> Result<()> { self.0.set(key, value) }
    fn get(&self, key: &str) -> Option<String> { self.0.get(key) }
    fn remove(&self, key: &str) -> Result<()> { self.0.remove(key) }
}
