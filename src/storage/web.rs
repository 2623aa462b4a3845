//! Browser storage areas backed by `window.localStorage` and `window.sessionStorage`.
//!
//! The area keeps no handle to the JS object; it looks the storage up on
//! every call, so it stays `Send + Sync` even though `web_sys` values are not.

use anyhow::{anyhow, Result};
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::host::StorageKind;
use crate::storage::area::StorageArea;

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// A DOM `Storage` object of the current window.
#[derive(Debug, Clone, Copy)]
pub struct WebStorageArea {
    kind: StorageKind,
}

impl WebStorageArea {
    /// Returns the area when the window exposes the storage for `kind`.
    ///
    /// Accessing the storage itself may throw (e.g. blocked third-party
    /// storage); that is reported as `None`.
    pub fn new(kind: StorageKind) -> Option<Self> {
        let area = Self { kind };
        area.storage().ok().map(|_| area)
    }

    fn storage(&self) -> Result<Storage> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no window available"))?;
        let storage = match self.kind {
            StorageKind::Durable => window.local_storage(),
            StorageKind::Session => window.session_storage(),
        };

        storage
            .map_err(js_error)?
            .ok_or_else(|| anyhow!("{} is not available", self.kind))
    }
}

impl StorageArea for WebStorageArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage().ok()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }

    fn clear(&self) -> Result<()> {
        self.storage()?.clear().map_err(js_error)
    }

    fn len(&self) -> usize {
        self.storage()
            .ok()
            .and_then(|s| s.length().ok())
            .unwrap_or(0) as usize
    }
}
