//! Cookie core types.
//!
//! This module defines the **type-erased handles** used by the store and the
//! serializable [`Cookie`] data structure.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!   Callers take a **read lock** for lookups and a **write lock** for
//!   mutations on the underlying jar.
//! - [`CookieStoreHandle`] is `Arc<dyn CookieStore + Send + Sync>`.
//!   Stores manage their **own internal synchronization**; the trait methods take `&self`.
//!
//! # Wire format
//! Cookies travel as plain `name=value` pairs. Names and values are
//! percent-encoded the way `encodeURIComponent` does it, so JSON payloads
//! with `;`, `,` or spaces survive a round-trip through `document.cookie`.
//!
//! ```rust
//! use gosub_store::cookies::{Cookie, CookieOptions};
//!
//! let c = Cookie::new("session", "{\"id\":1}", &CookieOptions::default());
//! assert_eq!(c.to_set_cookie_string(), "session=%7B%22id%22%3A1%7D; Path=/");
//! ```

use std::fmt;
use std::sync::{Arc, RwLock};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::cookies::store::CookieStore;
use crate::cookies::CookieJar;

/// A handle to a cookie jar trait.
///
/// This is a reference-counted, read/write-locked pointer to a type-erased
/// [`CookieJar`]. Obtain a **read lock** for queries and a **write lock** for
/// mutations.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A handle to a cookie store trait.
///
/// Store implementations must be **`Send + Sync` and internally synchronized**,
/// since callers hold only `&self` when invoking trait methods.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Attributes applied when a cookie is written.
///
/// The defaults scope the cookie to `/` and impose no expiry. What happens to
/// a cookie without expiry is up to the jar: `document.cookie` drops it when
/// the browser session ends, while a
/// [`PersistentCookieJar`](crate::cookies::PersistentCookieJar) keeps it
/// across restarts like any other cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    /// Expiry; `None` imposes none (see the type docs for persisted jars).
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: Some("/".to_string()),
            domain: None,
            expires: None,
            secure: false,
            same_site: None,
        }
    }
}

/// A cookie as stored/serialized by the jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Cookie value, not encoded.
    pub value: String,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration timestamp; `None` when the cookie was written without one.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,

    pub same_site: Option<SameSite>,

    /// If `true`, cookie is blocked from access by client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    /// Creates a cookie carrying the attributes from `options`.
    pub fn new(name: &str, value: &str, options: &CookieOptions) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: options.path.clone(),
            domain: options.domain.clone(),
            secure: options.secure,
            expires: options.expires,
            same_site: options.same_site,
            http_only: false,
        }
    }

    /// Returns `true` when the cookie expired at or before `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Renders the cookie as a `document.cookie` assignment / `Set-Cookie` value.
    pub fn to_set_cookie_string(&self) -> String {
        let mut out = format!("{}={}", encode(&self.name), encode(&self.value));

        if let Some(path) = &self.path {
            out.push_str(&format!("; Path={path}"));
        }
        if let Some(domain) = &self.domain {
            out.push_str(&format!("; Domain={domain}"));
        }
        if let Some(date) = self.expires.and_then(|at| at.format(&Rfc2822).ok()) {
            out.push_str(&format!("; Expires={date}"));
        }
        if let Some(same_site) = self.same_site {
            out.push_str(&format!("; SameSite={same_site}"));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }

        out
    }
}

/// Parses a `document.cookie` style string (`"a=1; b=2"`) into decoded pairs.
///
/// Entries without `=` are skipped.
pub fn parse_cookie_string(s: &str) -> Vec<(String, String)> {
    s.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .map(|(name, value)| (decode(name.trim()), decode(value.trim())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn set_cookie_string_encodes_json_values() {
        let c = Cookie::new("user", "{\"name\":\"a b\";}", &CookieOptions::default());
        assert_eq!(
            c.to_set_cookie_string(),
            "user=%7B%22name%22%3A%22a%20b%22%3B%7D; Path=/"
        );
    }

    #[test]
    fn set_cookie_string_includes_attributes() {
        let options = CookieOptions {
            path: Some("/app".into()),
            domain: Some("example.com".into()),
            expires: Some(datetime!(2030-01-02 03:04:05 UTC)),
            secure: true,
            same_site: Some(SameSite::Lax),
        };
        let s = Cookie::new("k", "v", &options).to_set_cookie_string();

        assert!(s.starts_with("k=v; Path=/app; Domain=example.com; Expires=Wed, 02 Jan 2030 03:04:05"));
        assert!(s.ends_with("; SameSite=Lax; Secure"));
    }

    #[test]
    fn parse_cookie_string_decodes_pairs() {
        let pairs = parse_cookie_string("a=1; user=%7B%22x%22%3A1%7D;broken; empty=");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("user".to_string(), "{\"x\":1}".to_string()),
                ("empty".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn expiry_is_inclusive() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let options = CookieOptions { expires: Some(at), ..Default::default() };
        let c = Cookie::new("k", "v", &options);

        assert!(!c.is_expired(datetime!(2024-05-01 11:59 UTC)));
        assert!(c.is_expired(at));
        assert!(!Cookie::new("k", "v", &CookieOptions::default()).is_expired(at));
    }

    #[test]
    fn cookie_serializes_expiry_as_rfc3339() {
        let options = CookieOptions {
            expires: Some(datetime!(2030-01-02 03:04:05 UTC)),
            ..Default::default()
        };
        let json = serde_json::to_string(&Cookie::new("k", "v", &options)).unwrap();
        assert!(json.contains("\"expires\":\"2030-01-02T03:04:05Z\""));

        let back: Cookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expires, options.expires);
    }
}
