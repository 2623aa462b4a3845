use anyhow::{anyhow, Result};

use crate::backend::{Backend, COOKIE_BACKEND};
use crate::cookies::{CookieJarHandle, CookieOptions};

/// Backend that keeps every entry in a cookie of the host's cookie jar.
///
/// No expiry policy is imposed here; cookies carry whatever the configured
/// [`CookieOptions`] say (no expiry by default).
#[derive(Clone)]
pub struct CookieBackend {
    jar: CookieJarHandle,
    options: CookieOptions,
}

impl CookieBackend {
    pub fn new(jar: CookieJarHandle, options: CookieOptions) -> Self {
        Self { jar, options }
    }

    pub fn jar(&self) -> &CookieJarHandle {
        &self.jar
    }
}

impl Backend for CookieBackend {
    fn name(&self) -> &str {
        COOKIE_BACKEND
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.jar
            .write()
            .map_err(|_| anyhow!("cookie jar lock poisoned"))?
            .put(key, value, &self.options)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.jar.read().ok()?.get(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.jar
            .write()
            .map_err(|_| anyhow!("cookie jar lock poisoned"))?
            .remove(key, &self.options)
    }
}
