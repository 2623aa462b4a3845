use std::collections::HashMap;

use serde_json::Value;

use crate::store::Scope;

/// In-memory shadow of the values an engine has read or written, keyed by
/// logical name. A `None` entry records a known "no value".
#[derive(Debug, Default)]
pub(crate) struct ScopedCache {
    persistent: HashMap<String, Option<Value>>,
    session: HashMap<String, Option<Value>>,
}

impl ScopedCache {
    fn partition(&self, scope: Scope) -> &HashMap<String, Option<Value>> {
        match scope {
            Scope::Persistent => &self.persistent,
            Scope::Session => &self.session,
        }
    }

    fn partition_mut(&mut self, scope: Scope) -> &mut HashMap<String, Option<Value>> {
        match scope {
            Scope::Persistent => &mut self.persistent,
            Scope::Session => &mut self.session,
        }
    }

    pub fn lookup(&self, scope: Scope, name: &str) -> Option<&Option<Value>> {
        self.partition(scope).get(name)
    }

    pub fn insert(&mut self, scope: Scope, name: &str, value: Option<Value>) {
        self.partition_mut(scope).insert(name.to_string(), value);
    }

    pub fn clear(&mut self) {
        self.persistent.clear();
        self.session.clear();
    }

    pub fn len(&self) -> usize {
        self.persistent.len() + self.session.len()
    }
}
