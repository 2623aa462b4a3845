//! Namespaced storage keys.
//!
//! Stores sharing one backend are kept apart by prefixing their keys with a
//! namespace: `namespace + delimiter + name`. A store without a namespace
//! writes its logical names verbatim.

/// Delimiter used when none (or an empty one) is given.
pub const DEFAULT_DELIMITER: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: Option<String>,
    delimiter: String,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(None::<String>, None::<String>)
    }
}

impl Namespace {
    /// Creates a namespace. An empty prefix counts as no namespace and an
    /// empty delimiter falls back to [`DEFAULT_DELIMITER`].
    pub fn new<P, D>(prefix: Option<P>, delimiter: Option<D>) -> Self
    where
        P: Into<String>,
        D: Into<String>,
    {
        let prefix = prefix.map(Into::into).filter(|p| !p.is_empty());
        let delimiter = delimiter
            .map(Into::into)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

        Self { prefix, delimiter }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Resolves the backend key for a logical name.
    pub fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}{name}", self.delimiter),
            None => name.to_string(),
        }
    }
}
