//! Cookie jar over `document.cookie`.
use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

use crate::cookies::{parse_cookie_string, Cookie, CookieJar, CookieOptions};

/// The cookies of the current document. Lookups go through `document.cookie`
/// every time, so the jar observes cookies written by other scripts too.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCookieJar;

impl DocumentCookieJar {
    pub fn new() -> Self {
        Self
    }

    fn document(&self) -> Result<HtmlDocument> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<HtmlDocument>().ok())
            .ok_or_else(|| anyhow!("no HTML document available"))
    }

    fn write(&self, cookie: &Cookie) -> Result<()> {
        self.document()?
            .set_cookie(&cookie.to_set_cookie_string())
            .map_err(|e| anyhow!("cannot write cookie '{}': {:?}", cookie.name, e))
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.document()
            .ok()
            .and_then(|d| d.cookie().ok())
            .map(|s| parse_cookie_string(&s))
            .unwrap_or_default()
    }
}

impl CookieJar for DocumentCookieJar {
    fn put(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        self.write(&Cookie::new(name, value, options))
    }

    fn get(&self, name: &str) -> Option<String> {
        self.pairs()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn remove(&mut self, name: &str, options: &CookieOptions) -> Result<()> {
        let expired = CookieOptions {
            expires: Some(OffsetDateTime::UNIX_EPOCH),
            ..options.clone()
        };
        self.write(&Cookie::new(name, "", &expired))
    }

    fn get_all(&self) -> Vec<(String, String)> {
        self.pairs()
    }

    fn clear(&mut self) -> Result<()> {
        let options = CookieOptions::default();
        for (name, _) in self.pairs() {
            self.remove(&name, &options)?;
        }
        Ok(())
    }
}
