//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds the cookies a host exposes to scripts, the way
//! `document.cookie` does: cookies are looked up by name, and writing a cookie
//! with an existing name replaces it.
//!
//! ## Notes & limitations
//! - Expired cookies are invisible to reads and are purged on the next mutation.
//! - Path and domain attributes are stored but not used for matching: every
//!   cookie in the jar is visible to the store.
//! - This module is **not** internally synchronized. Use it via a
//!   `CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>`.
use std::sync::{Arc, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::cookies::{Cookie, CookieJarHandle, CookieOptions};

/// A cookie jar keeps the script-visible cookies of one host.
pub trait CookieJar: Send + Sync {
    /// Writes the cookie `name` with `value`, replacing any existing cookie of
    /// that name. A cookie whose expiry lies in the past removes it instead.
    fn put(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()>;

    /// Returns the value of the live cookie `name`, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Removes the cookie `name`. `options` carries the path/domain it was written with.
    fn remove(&mut self, name: &str, options: &CookieOptions) -> Result<()>;

    /// Returns all live cookies as `(name, value)` pairs.
    fn get_all(&self) -> Vec<(String, String)>;

    /// Removes all cookies from the jar.
    fn clear(&mut self) -> Result<()>;
}

/// Default cookie jar, **in-memory only**.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    /// Cookies in insertion order.
    pub cookies: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the jar into a shareable handle.
    pub fn into_handle(self) -> CookieJarHandle {
        Arc::new(RwLock::new(self))
    }

    fn purge_expired(&mut self, now: OffsetDateTime) {
        self.cookies.retain(|c| !c.is_expired(now));
    }
}

impl CookieJar for DefaultCookieJar {
    fn put(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        let now = OffsetDateTime::now_utc();
        self.purge_expired(now);

        let cookie = Cookie::new(name, value, options);
        if cookie.is_expired(now) {
            self.cookies.retain(|c| c.name != name);
            return Ok(());
        }

        // Replace existing cookie with same name
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        self.cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.clone())
    }

    fn remove(&mut self, name: &str, _options: &CookieOptions) -> Result<()> {
        self.purge_expired(OffsetDateTime::now_utc());
        self.cookies.retain(|c| c.name != name);
        Ok(())
    }

    fn get_all(&self) -> Vec<(String, String)> {
        let now = OffsetDateTime::now_utc();
        self.cookies
            .iter()
            .filter(|c| !c.is_expired(now))
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }

    fn clear(&mut self) -> Result<()> {
        self.cookies.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn put_get_remove() {
        let mut jar = DefaultCookieJar::new();
        let opts = CookieOptions::default();

        assert!(jar.get("missing").is_none());

        jar.put("a", "1", &opts).unwrap();
        jar.put("b", "2", &opts).unwrap();
        assert_eq!(jar.get("a").as_deref(), Some("1"));

        // Same name replaces, keeps position
        jar.put("a", "ONE", &opts).unwrap();
        assert_eq!(
            jar.get_all(),
            vec![("a".to_string(), "ONE".to_string()), ("b".to_string(), "2".to_string())]
        );

        jar.remove("a", &opts).unwrap();
        assert!(jar.get("a").is_none());
        assert_eq!(jar.cookies.len(), 1);

        jar.clear().unwrap();
        assert!(jar.get_all().is_empty());
    }

    #[test]
    fn expired_cookies_are_invisible_and_purged() {
        let mut jar = DefaultCookieJar::new();
        let past = CookieOptions {
            expires: Some(OffsetDateTime::now_utc() - Duration::hours(1)),
            ..Default::default()
        };

        jar.cookies.push(Cookie::new("stale", "x", &past));
        assert!(jar.get("stale").is_none());
        assert!(jar.get_all().is_empty());

        jar.put("fresh", "y", &CookieOptions::default()).unwrap();
        assert_eq!(jar.cookies.len(), 1);
    }

    #[test]
    fn putting_an_expired_cookie_deletes_it() {
        let mut jar = DefaultCookieJar::new();
        jar.put("k", "v", &CookieOptions::default()).unwrap();

        let past = CookieOptions {
            expires: Some(OffsetDateTime::UNIX_EPOCH),
            ..Default::default()
        };
        jar.put("k", "gone", &past).unwrap();

        assert!(jar.get("k").is_none());
        assert!(jar.cookies.is_empty());
    }

    #[test]
    fn handle_shares_state() {
        let handle = DefaultCookieJar::new().into_handle();
        let other = handle.clone();

        handle.write().unwrap().put("k", "v", &CookieOptions::default()).unwrap();
        assert_eq!(other.read().unwrap().get("k").as_deref(), Some("v"));
    }
}
