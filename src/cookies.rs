//! Cookies: [`Cookie`], [`CookieJar`], [`CookieStore`] and their implementations.
//!
//! The cookie jar is the universal fallback of the store: it is available on
//! every host, and the durable and session backends delegate to it when their
//! native storage cannot be used.

mod cookies;
mod cookie_jar;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod document;
mod persistent_cookie_jar;
mod store;

pub use cookies::{parse_cookie_string, Cookie, CookieJarHandle, CookieOptions, CookieStoreHandle, SameSite};

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use document::DocumentCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use store::CookieStore;
pub use store::JsonCookieStore;
