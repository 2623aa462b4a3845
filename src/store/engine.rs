use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::Backend;
use crate::config::WritePolicy;
use crate::errors::StoreError;
use crate::namespace::Namespace;
use crate::store::cache::ScopedCache;
use crate::store::Scope;

/// Raw placeholder stored for an explicit "no value" write. Reads of this
/// placeholder, like reads of a missing entry, yield no value.
pub const UNDEFINED: &str = "undefined";

/// Namespaced JSON values over a persistent backend and the session backend,
/// shadowed by an in-memory cache.
///
/// The cache starts empty and is private to the engine. Two engines over the
/// same namespace and backend do not see each other's cached values; each
/// only picks up the other's writes for names it has not cached yet.
///
/// # Write ordering
///
/// With [`WritePolicy::CacheThenWrite`] (the default) `set` and `remove`
/// update the cache before the backend. A failing backend write is returned
/// to the caller, but the cache has advanced and later reads through this
/// engine see the new value. [`WritePolicy::WriteThenCache`] only updates the
/// cache once the backend accepted the change.
///
/// # Corrupt values
///
/// A stored value that is not valid JSON is logged, removed from cache and
/// backend, and read as "no value". Numbers outside the `f64` range (e.g.
/// `1e400`) count as invalid: they cannot be represented as a
/// [`Value`] and are removed like any other unparsable value.
pub struct StoreEngine {
    namespace: Namespace,
    storage: Arc<dyn Backend>,
    session_storage: Arc<dyn Backend>,
    cache: ScopedCache,
    write_policy: WritePolicy,
}

impl fmt::Debug for StoreEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreEngine")
            .field("namespace", &self.namespace)
            .field("storage", &self.storage.name())
            .field("session_storage", &self.session_storage.name())
            .field("write_policy", &self.write_policy)
            .finish_non_exhaustive()
    }
}

impl StoreEngine {
    pub fn new(
        namespace: Namespace,
        storage: Arc<dyn Backend>,
        session_storage: Arc<dyn Backend>,
        write_policy: WritePolicy,
    ) -> Self {
        Self {
            namespace,
            storage,
            session_storage,
            cache: ScopedCache::default(),
            write_policy,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.prefix()
    }

    pub fn delimiter(&self) -> &str {
        self.namespace.delimiter()
    }

    /// Name of the backend used for persistent values.
    pub fn backend_name(&self) -> &str {
        self.storage.name()
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Resolves the backend key for a logical name.
    pub fn get_namespaced_key(&self, name: &str) -> String {
        self.namespace.key(name)
    }

    /// Forgets every cached value. The next reads go to the backends.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached entries over both scopes.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn backend(&self, scope: Scope) -> Arc<dyn Backend> {
        match scope {
            Scope::Persistent => Arc::clone(&self.storage),
            Scope::Session => Arc::clone(&self.session_storage),
        }
    }

    /// Stores `value` under `name`; `None` stores the [`UNDEFINED`] placeholder.
    pub fn set_value_in(&mut self, scope: Scope, name: &str, value: Option<Value>) -> Result<(), StoreError> {
        let raw = match &value {
            Some(v) => serde_json::to_string(v).map_err(StoreError::Serialize)?,
            None => UNDEFINED.to_string(),
        };
        let key = self.namespace.key(name);
        let backend = self.backend(scope);

        match self.write_policy {
            WritePolicy::CacheThenWrite => {
                self.cache.insert(scope, name, value);
                backend.set(&key, &raw)?;
            }
            WritePolicy::WriteThenCache => {
                backend.set(&key, &raw)?;
                self.cache.insert(scope, name, value);
            }
        }
        Ok(())
    }

    /// Returns the value stored under `name`, from the cache when present.
    pub fn get_value_in(&mut self, scope: Scope, name: &str) -> Option<Value> {
        if let Some(cached) = self.cache.lookup(scope, name) {
            return cached.clone();
        }

        let key = self.namespace.key(name);
        let saved = self.backend(scope).get(&key);

        let parsed = match saved.as_deref() {
            None | Some(UNDEFINED) => Ok(None),
            Some(raw) => serde_json::from_str::<Value>(raw).map(Some),
        };

        match parsed {
            Ok(value) => {
                self.cache.insert(scope, name, value.clone());
                value
            }
            Err(e) => {
                log::error!("Error parsing saved value for '{key}': {e}");
                if let Err(e) = self.remove_in(scope, name) {
                    log::warn!("Cannot remove unparsable value '{key}': {e}");
                }
                None
            }
        }
    }

    /// Removes `name` from the cache and the backend.
    pub fn remove_in(&mut self, scope: Scope, name: &str) -> Result<(), StoreError> {
        let key = self.namespace.key(name);
        let backend = self.backend(scope);

        match self.write_policy {
            WritePolicy::CacheThenWrite => {
                self.cache.insert(scope, name, None);
                backend.remove(&key)?;
            }
            WritePolicy::WriteThenCache => {
                backend.remove(&key)?;
                self.cache.insert(scope, name, None);
            }
        }
        Ok(())
    }

    fn set_typed<T: Serialize + ?Sized>(&mut self, scope: Scope, name: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(StoreError::Serialize)?;
        self.set_value_in(scope, name, Some(value))
    }

    fn get_typed<T: DeserializeOwned>(&mut self, scope: Scope, name: &str) -> Result<Option<T>, StoreError> {
        match self.get_value_in(scope, name) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode { name: name.to_string(), source }),
        }
    }

    // ---------- persistent scope ----------

    pub fn set<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), StoreError> {
        self.set_typed(Scope::Persistent, name, value)
    }

    /// Reads `name` as `T`. A value that is valid JSON but does not fit `T`
    /// is a [`StoreError::Decode`].
    pub fn get<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>, StoreError> {
        self.get_typed(Scope::Persistent, name)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.remove_in(Scope::Persistent, name)
    }

    pub fn set_value(&mut self, name: &str, value: Option<Value>) -> Result<(), StoreError> {
        self.set_value_in(Scope::Persistent, name, value)
    }

    pub fn get_value(&mut self, name: &str) -> Option<Value> {
        self.get_value_in(Scope::Persistent, name)
    }

    // ---------- session scope ----------

    pub fn set_session<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), StoreError> {
        self.set_typed(Scope::Session, name, value)
    }

    pub fn get_session<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>, StoreError> {
        self.get_typed(Scope::Session, name)
    }

    pub fn remove_session(&mut self, name: &str) -> Result<(), StoreError> {
        self.remove_in(Scope::Session, name)
    }

    pub fn set_session_value(&mut self, name: &str, value: Option<Value>) -> Result<(), StoreError> {
        self.set_value_in(Scope::Session, name, value)
    }

    pub fn get_session_value(&mut self, name: &str) -> Option<Value> {
        self.get_value_in(Scope::Session, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CookieBackend, DurableBackend, SessionBackend};
    use crate::cookies::CookieOptions;
    use crate::host::{Host, StorageKind};
    use crate::storage::{MemoryArea, StorageArea};
    use serde::Deserialize;
    use serde_json::json;

    struct Fixture {
        host: Host,
        durable: Arc<dyn Backend>,
        session: Arc<dyn Backend>,
    }

    impl Fixture {
        fn new() -> Self {
            let _ = env_logger::builder().is_test(true).try_init();

            let host = Host::in_memory();
            let cookies = CookieBackend::new(host.cookie_jar(), CookieOptions::default());
            let durable: Arc<dyn Backend> = Arc::new(DurableBackend::new(&host, cookies.clone()));
            let session: Arc<dyn Backend> = Arc::new(SessionBackend::new(&host, cookies));
            Self { host, durable, session }
        }

        fn engine(&self, namespace: Option<&str>) -> StoreEngine {
            self.engine_with(namespace, self.durable.clone(), WritePolicy::CacheThenWrite)
        }

        fn engine_with(&self, namespace: Option<&str>, storage: Arc<dyn Backend>, policy: WritePolicy) -> StoreEngine {
            StoreEngine::new(Namespace::new(namespace, None::<&str>), storage, self.session.clone(), policy)
        }

        fn raw(&self, kind: StorageKind, key: &str) -> Option<String> {
            self.host.storage(kind).unwrap().get_item(key)
        }

        fn write_raw(&self, kind: StorageKind, key: &str, value: &str) {
            self.host.storage(kind).unwrap().set_item(key, value).unwrap();
        }
    }

    /// Reads from memory, refuses every write.
    #[derive(Default)]
    struct ReadOnlyBackend(MemoryArea);

    impl ReadOnlyBackend {
        fn with(key: &str, value: &str) -> Self {
            let area = MemoryArea::new();
            area.set_item(key, value).unwrap();
            Self(area)
        }
    }

    impl Backend for ReadOnlyBackend {
        fn name(&self) -> &str { "readOnly" }
        fn set(&self, key: &str, _value: &str) -> anyhow::Result<()> { anyhow::bail!("quota exceeded writing '{key}'") }
        fn get(&self, key: &str) -> Option<String> { self.0.get_item(key) }
        fn remove(&self, key: &str) -> anyhow::Result<()> { anyhow::bail!("cannot remove '{key}'") }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
        age: u8,
    }

    #[test]
    fn set_then_get_returns_the_value() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        let values = [
            json!({"a": 1, "b": [true, null, "x"]}),
            json!([1, 2.5, -3]),
            json!("text with \"quotes\""),
            json!(42),
            json!(false),
            json!(null),
        ];
        for (i, v) in values.iter().enumerate() {
            let name = format!("v{i}");
            engine.set_value(&name, Some(v.clone())).unwrap();
            assert_eq!(engine.get_value(&name).as_ref(), Some(v));
        }

        let profile = Profile { name: "ann".into(), tags: vec!["a".into()], age: 7 };
        engine.set("profile", &profile).unwrap();
        assert_eq!(engine.get::<Profile>("profile").unwrap(), Some(profile));
    }

    #[test]
    fn values_are_stored_as_json_under_the_namespaced_key() {
        let fx = Fixture::new();
        let mut engine = fx.engine(Some("app"));

        engine.set("user", &json!({"id": 1})).unwrap();
        assert_eq!(fx.raw(StorageKind::Durable, "app.user").as_deref(), Some("{\"id\":1}"));
        assert!(fx.raw(StorageKind::Durable, "user").is_none());

        // a fresh engine reads the persisted value; its cache starts empty
        let mut fresh = fx.engine(Some("app"));
        assert_eq!(fresh.cached_len(), 0);
        assert_eq!(fresh.get_value("user"), Some(json!({"id": 1})));
    }

    #[test]
    fn unwritten_names_have_no_value() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        assert_eq!(engine.get_value("never"), None);
        assert_eq!(engine.get::<String>("never").unwrap(), None);
        assert_eq!(engine.get_session_value("never"), None);
    }

    #[test]
    fn undefined_placeholder_reads_as_no_value() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        engine.set_value("k", None).unwrap();
        assert_eq!(fx.raw(StorageKind::Durable, "k").as_deref(), Some(UNDEFINED));
        assert_eq!(engine.get_value("k"), None);

        fx.write_raw(StorageKind::Durable, "raw", UNDEFINED);
        assert_eq!(fx.engine(None).get_value("raw"), None);
        // the placeholder is not treated as corrupt
        assert_eq!(fx.raw(StorageKind::Durable, "raw").as_deref(), Some(UNDEFINED));
    }

    #[test]
    fn remove_is_visible_to_fresh_engines() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        engine.set("k", &1).unwrap();
        engine.remove("k").unwrap();
        assert_eq!(engine.get_value("k"), None);
        assert!(fx.raw(StorageKind::Durable, "k").is_none());

        let mut fresh = fx.engine(None);
        assert_eq!(fresh.get_value("k"), None);
    }

    #[test]
    fn cached_values_are_served_without_the_backend() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        engine.set("k", &"mine").unwrap();
        fx.write_raw(StorageKind::Durable, "k", "\"theirs\"");
        assert_eq!(engine.get::<String>("k").unwrap().as_deref(), Some("mine"));

        // misses are cached too
        assert_eq!(engine.get_value("late"), None);
        fx.write_raw(StorageKind::Durable, "late", "1");
        assert_eq!(engine.get_value("late"), None);

        engine.clear_cache();
        assert_eq!(engine.get::<String>("k").unwrap().as_deref(), Some("theirs"));
        assert_eq!(engine.get_value("late"), Some(json!(1)));
    }

    #[test]
    fn corrupt_values_are_removed() {
        let fx = Fixture::new();
        let mut engine = fx.engine(Some("ns"));

        fx.write_raw(StorageKind::Durable, "ns.broken", "{not json");
        assert_eq!(engine.get_value("broken"), None);
        assert!(fx.raw(StorageKind::Durable, "ns.broken").is_none());
        assert_eq!(engine.get_value("broken"), None);

        // an empty string is not JSON either
        fx.write_raw(StorageKind::Session, "ns.empty", "");
        assert_eq!(engine.get_session::<u32>("empty").unwrap(), None);
        assert!(fx.raw(StorageKind::Session, "ns.empty").is_none());
    }

    #[test]
    fn out_of_range_numbers_are_removed() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        fx.write_raw(StorageKind::Durable, "big", "1e400");
        assert_eq!(engine.get_value("big"), None);
        assert!(fx.raw(StorageKind::Durable, "big").is_none());

        // large but finite values are kept
        fx.write_raw(StorageKind::Durable, "large", "1e300");
        let large = engine.get_value("large").and_then(|v| v.as_f64());
        assert!(large.is_some_and(|n| n > 1e299));
        assert_eq!(fx.raw(StorageKind::Durable, "large").as_deref(), Some("1e300"));
    }

    #[test]
    fn valid_json_of_the_wrong_shape_is_a_decode_error() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        engine.set("n", &"not a number").unwrap();
        let err = engine.get::<u32>("n").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref name, .. } if name == "n"));
        // the stored value is untouched
        assert_eq!(fx.raw(StorageKind::Durable, "n").as_deref(), Some("\"not a number\""));
    }

    #[test]
    fn namespaced_engines_do_not_see_each_other() {
        let fx = Fixture::new();
        let mut a = fx.engine(Some("a"));
        let mut b = fx.engine(Some("b"));

        a.set("k", &1).unwrap();
        b.set("k", &2).unwrap();

        assert_eq!(a.get::<u32>("k").unwrap(), Some(1));
        assert_eq!(b.get::<u32>("k").unwrap(), Some(2));
        assert_eq!(fx.engine(Some("a")).get::<u32>("k").unwrap(), Some(1));
        assert_eq!(fx.engine(Some("c")).get::<u32>("k").unwrap(), None);
    }

    #[test]
    fn session_and_persistent_scopes_are_separate() {
        let fx = Fixture::new();
        let mut engine = fx.engine(None);

        engine.set("k", &"persistent").unwrap();
        engine.set_session("k", &"session").unwrap();

        assert_eq!(engine.get::<String>("k").unwrap().as_deref(), Some("persistent"));
        assert_eq!(engine.get_session::<String>("k").unwrap().as_deref(), Some("session"));
        assert_eq!(fx.raw(StorageKind::Durable, "k").as_deref(), Some("\"persistent\""));
        assert_eq!(fx.raw(StorageKind::Session, "k").as_deref(), Some("\"session\""));

        engine.remove_session("k").unwrap();
        assert_eq!(engine.get_session_value("k"), None);
        assert_eq!(engine.get::<String>("k").unwrap().as_deref(), Some("persistent"));
        assert_eq!(fx.raw(StorageKind::Durable, "k").as_deref(), Some("\"persistent\""));
    }

    #[test]
    fn failed_write_still_advances_the_cache_by_default() {
        let fx = Fixture::new();
        let backend: Arc<dyn Backend> = Arc::new(ReadOnlyBackend::default());
        let mut engine = fx.engine_with(None, backend, WritePolicy::CacheThenWrite);

        let err = engine.set("k", &1).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(engine.get::<u32>("k").unwrap(), Some(1));

        assert!(engine.remove("k").is_err());
        assert_eq!(engine.get_value("k"), None);
    }

    #[test]
    fn write_then_cache_keeps_the_cache_on_failure() {
        let fx = Fixture::new();
        let backend: Arc<dyn Backend> = Arc::new(ReadOnlyBackend::with("k", "5"));
        let mut engine = fx.engine_with(None, backend, WritePolicy::WriteThenCache);

        assert!(engine.set("k", &1).is_err());
        assert_eq!(engine.get::<u32>("k").unwrap(), Some(5));

        assert!(engine.remove("k").is_err());
        assert_eq!(engine.get::<u32>("k").unwrap(), Some(5));
    }

    #[test]
    fn introspection() {
        let fx = Fixture::new();
        let engine = StoreEngine::new(
            Namespace::new(Some("ns"), Some(":")),
            fx.durable.clone(),
            fx.session.clone(),
            WritePolicy::WriteThenCache,
        );

        assert_eq!(engine.namespace(), Some("ns"));
        assert_eq!(engine.delimiter(), ":");
        assert_eq!(engine.backend_name(), "localStorage");
        assert_eq!(engine.write_policy(), WritePolicy::WriteThenCache);
        assert_eq!(engine.get_namespaced_key("k"), "ns:k");
        assert!(format!("{engine:?}").contains("localStorage"));
    }
}
