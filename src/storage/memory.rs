use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};

use crate::storage::area::StorageArea;

/// In‑memory storage area (no persistence). Used for session storage and as
/// the default durable storage of an in-memory host.
#[derive(Default)]
pub struct MemoryArea {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.map.lock().map_err(|_| anyhow!("storage area lock poisoned"))
    }
}

impl StorageArea for MemoryArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map()?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }
}

/// Storage area that exists but refuses every write, the way `setItem`
/// throws in some private browsing modes. Reads always come back empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledArea;

impl StorageArea for DisabledArea {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        bail!("storage is disabled, cannot set '{key}'")
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        bail!("storage is disabled, cannot remove '{key}'")
    }

    fn clear(&self) -> Result<()> {
        bail!("storage is disabled")
    }

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storagearea_basic_contract() {
        let area = MemoryArea::new();

        // starts empty
        assert_eq!(area.len(), 0);
        assert!(area.is_empty());
        assert!(area.get_item("missing").is_none());

        // set + get
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("1"));
        assert_eq!(area.get_item("b").as_deref(), Some("2"));

        // overwrite keeps len()
        area.set_item("a", "ONE").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("ONE"));

        // remove
        area.remove_item("b").unwrap();
        assert_eq!(area.len(), 1);
        assert!(area.get_item("b").is_none());

        // removing a missing key is not an error
        area.remove_item("b").unwrap();

        // clear
        area.clear().unwrap();
        assert!(area.is_empty());
    }

    #[test]
    fn disabled_area_rejects_writes() {
        let area = DisabledArea;
        assert!(area.set_item("k", "v").is_err());
        assert!(area.remove_item("k").is_err());
        assert!(area.clear().is_err());
        assert!(area.get_item("k").is_none());
        assert!(area.is_empty());
    }
}
